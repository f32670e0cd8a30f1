#![no_main]

use libfuzzer_sys::fuzz_target;
use quatt::{DerivedMetrics, FixedElectricalPower, RawSnapshot};
use serde_json::Value;

fuzz_target!(|input: (&str, &str)| {
    let (snapshot, path) = input;
    let Ok(root) = serde_json::from_str::<Value>(snapshot) else {
        return;
    };
    let Ok(snapshot) = RawSnapshot::try_from(root) else {
        return;
    };

    let electrical_power = FixedElectricalPower(0.);
    let metrics = DerivedMetrics::new(&snapshot, &electrical_power);
    let _value = metrics.get_value(path, Some(Value::Null));
});
