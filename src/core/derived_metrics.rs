use crate::compare_floats::{floor_at_zero, round_to_2dp, without_negative_zero};
use crate::core::electrical_power::ElectricalPowerSource;
use crate::core::material_properties::conversion_factor;
use crate::core::metrics::{ComputedMetric, MetricValue};
use crate::core::path::{segments, Segment};
use crate::core::supervisory_control::{
    boiler_heating, heatpump_heating, SupervisoryControlMode,
};
use crate::snapshot::{as_number, RawSnapshot};
use serde_json::Value;
use tracing::{debug, warn};

/// Section of a snapshot that is only present on duo installations.
const HEATPUMP_2: &str = "hp2";

/// What a path resolves to, before any default is applied.
#[derive(Debug)]
enum Resolved<'a> {
    Raw(&'a Value),
    Computed(Option<MetricValue>),
    Missing,
}

/// The raw readings of one snapshot, plus everything that can be derived from them.
///
/// Every derivation is recomputed from the snapshot each time it is asked for. Derivations
/// take an optional context: the path that was consumed before the derivation was reached
/// (e.g. `hp1` for `hp1.computedWaterDelta`), or `None` when asked for directly.
#[derive(Debug)]
pub struct DerivedMetrics<'a> {
    snapshot: &'a RawSnapshot,
    electrical_power: &'a dyn ElectricalPowerSource,
}

impl<'a> DerivedMetrics<'a> {
    pub fn new(
        snapshot: &'a RawSnapshot,
        electrical_power: &'a dyn ElectricalPowerSource,
    ) -> Self {
        Self {
            snapshot,
            electrical_power,
        }
    }

    /// Retrieve a value by dot notation, e.g. `hp1.temperatureWaterOut`, `hp1.readings.2` or
    /// `hp1.computedQuattCop`.
    ///
    /// Returns `default` when the path leads nowhere. A computed metric ends the walk and its
    /// result is returned as is, even when that is `None`. A value found at the end of the path
    /// is returned unmodified, except that a JSON `null` is returned as `None`.
    pub fn get_value(&self, value_path: &str, default: Option<Value>) -> Option<Value> {
        match self.resolve(value_path) {
            Resolved::Raw(Value::Null) => None,
            Resolved::Raw(value) => Some(value.clone()),
            // a non-finite number has no JSON form and would come out as null
            Resolved::Computed(value) => value.map(Value::from).filter(|value| !value.is_null()),
            Resolved::Missing => default,
        }
    }

    pub fn metric(&self, metric: ComputedMetric, context: Option<&str>) -> Option<MetricValue> {
        metric.evaluate(self, context)
    }

    fn resolve(&self, value_path: &str) -> Resolved<'a> {
        let mut value = self.snapshot.root();

        for (parent, segment) in segments(value_path) {
            if value.is_null() {
                return Resolved::Missing;
            }

            match segment {
                Segment::Index(raw, index) => match value.as_array().and_then(|list| list.get(index)) {
                    Some(item) => value = item,
                    None => {
                        warn!("Could not find {raw} of {value_path}");
                        debug!("in {value}");
                        return Resolved::Missing;
                    }
                },
                Segment::Computed(name, derivation) => {
                    debug!("Computing {name} for {value_path}");
                    return Resolved::Computed(derivation(self, parent));
                }
                Segment::Key(key) => match value.as_object().and_then(|map| map.get(key)) {
                    Some(child) => value = child,
                    None => {
                        // single heat pump installations have no hp2 section at all
                        if key != HEATPUMP_2 {
                            warn!("Could not find {key} of {value_path}");
                            debug!("in {value}");
                        }
                        return Resolved::Missing;
                    }
                },
            }
        }

        Resolved::Raw(value)
    }

    fn is_present(&self, value_path: &str) -> bool {
        match self.resolve(value_path) {
            Resolved::Raw(value) => !value.is_null(),
            Resolved::Computed(value) => value.is_some(),
            Resolved::Missing => false,
        }
    }

    fn number(&self, value_path: &str) -> Option<f64> {
        match self.resolve(value_path) {
            Resolved::Raw(value) => as_number(value),
            Resolved::Computed(value) => value.and_then(|value| value.as_number()),
            Resolved::Missing => None,
        }
    }

    /// `None` when the CIC reports no code at all, `Some(None)` when it reports something that
    /// is not a numeric code.
    fn supervisory_control_code(&self) -> Option<Option<f64>> {
        match self.resolve("qc.supervisoryControlMode") {
            Resolved::Raw(Value::Null) | Resolved::Missing => None,
            Resolved::Raw(Value::Number(code)) => Some(code.as_f64()),
            Resolved::Raw(_) | Resolved::Computed(_) => Some(None),
        }
    }

    pub fn heatpump1_active(&self) -> bool {
        self.is_present("hp1")
    }

    pub fn heatpump2_active(&self) -> bool {
        self.is_present(HEATPUMP_2)
    }

    /// Whether a boiler is connected to the CIC over OpenTherm.
    pub fn boiler_open_therm(&self) -> bool {
        self.is_present("boiler.otFbChModeActive")
    }

    /// The heat pump whose outlet feeds the system: heat pump 2 on duo installations.
    fn active_heatpump(&self) -> &'static str {
        if self.heatpump2_active() {
            HEATPUMP_2
        } else {
            "hp1"
        }
    }

    pub fn electrical_power(&self) -> Option<f64> {
        self.electrical_power.electrical_power()
    }

    /// Water temperature gained across the heat pump(s), in K.
    ///
    /// Without a context this is the active heat pump's outlet against heat pump 1's inlet,
    /// heat pump 1 being where the return water enters on duo installations too.
    pub fn water_delta(&self, context: Option<&str>) -> Option<f64> {
        let (temperature_water_out, temperature_water_in) = match context {
            Some(context) => (
                self.number(&format!("{context}.temperatureWaterOut")),
                self.number(&format!("{context}.temperatureWaterIn")),
            ),
            None => (
                self.number(&format!("{}.temperatureWaterOut", self.active_heatpump())),
                self.number("hp1.temperatureWaterIn"),
            ),
        };
        let context = context.unwrap_or_default();

        debug!("{context}.computedWaterDelta.temperatureWaterOut {temperature_water_out:?}");
        debug!("{context}.computedWaterDelta.temperatureWaterIn {temperature_water_in:?}");

        Some(round_to_2dp(temperature_water_out? - temperature_water_in?))
    }

    /// Heat delivered by the heat pump(s) in W.
    pub fn heat_power(&self, _context: Option<&str>) -> Option<f64> {
        let state = self.supervisory_control_code();
        debug!("computedHeatPower.supervisoryControlMode: {state:?}");

        if !state?.is_some_and(heatpump_heating) {
            return Some(0.);
        }

        let water_delta = self.water_delta(None);
        let temperature_water_out =
            self.number(&format!("{}.temperatureWaterOut", self.active_heatpump()));
        let flow_rate = self.number("qc.flowRateFiltered");

        debug!("computedHeatPower.computedWaterDelta {water_delta:?}");
        debug!("computedHeatPower.flowRate {flow_rate:?}");
        debug!("computedHeatPower.temperatureWaterOut {temperature_water_out:?}");

        let value = round_to_2dp(
            water_delta? * flow_rate? * conversion_factor(temperature_water_out?),
        );

        Some(floor_at_zero(value))
    }

    /// Heat the boiler adds on top of the heat pump(s) in W, measured as the rise from the
    /// heat pump outlet to the flow meter's supply temperature.
    pub fn boiler_heat_power(&self, _context: Option<&str>) -> Option<f64> {
        let state = self.supervisory_control_code();
        debug!("computedBoilerHeatPower.supervisoryControlMode: {state:?}");

        if !state?.is_some_and(boiler_heating) {
            return Some(0.);
        }

        let heatpump_water_out =
            self.number(&format!("{}.temperatureWaterOut", self.active_heatpump()));
        let flow_rate = self.number("qc.flowRateFiltered");
        let flow_water_temperature = self.number("flowMeter.waterSupplyTemperature");

        debug!("computedBoilerHeatPower.temperatureWaterOut: {heatpump_water_out:?}");
        debug!("computedBoilerHeatPower.flowRate: {flow_rate:?}");
        debug!("computedBoilerHeatPower.waterSupplyTemperature: {flow_water_temperature:?}");

        let flow_water_temperature = flow_water_temperature?;
        let value = round_to_2dp(
            (flow_water_temperature - heatpump_water_out?)
                * flow_rate?
                * conversion_factor(flow_water_temperature),
        );

        Some(floor_at_zero(value))
    }

    /// Heat delivered by heat pump(s) and boiler together, in W: the boiler's computed heat
    /// power plus the heat output the heat pumps report themselves.
    pub fn system_power(&self, context: Option<&str>) -> Option<f64> {
        let boiler_power = self.boiler_heat_power(context);
        let heatpump_power = Some(self.power(context));

        debug!("computedSystemPower.boilerPower: {boiler_power:?}");
        debug!("computedSystemPower.heatpumpPower: {heatpump_power:?}");

        Some(boiler_power? + heatpump_power?)
    }

    /// Electrical power drawn by all heat pumps as reported by the CIC, in W.
    pub fn power_input(&self, _context: Option<&str>) -> f64 {
        self.sum_over_heatpumps("powerInput")
    }

    /// Heat output of all heat pumps as reported by the CIC, in W.
    pub fn power(&self, _context: Option<&str>) -> f64 {
        self.sum_over_heatpumps("power")
    }

    fn sum_over_heatpumps(&self, field: &str) -> f64 {
        let heatpump_1 = self.number(&format!("hp1.{field}")).unwrap_or(0.);
        let heatpump_2 = if self.heatpump2_active() {
            self.number(&format!("{HEATPUMP_2}.{field}")).unwrap_or(0.)
        } else {
            0.
        };

        heatpump_1 + heatpump_2
    }

    /// COP from the computed heat power against an externally metered electrical power.
    pub fn cop(&self, context: Option<&str>) -> Option<f64> {
        let electrical_power = self.electrical_power();
        let heat_power = self.heat_power(context);

        debug!("computedCop.electricalPower {electrical_power:?}");
        debug!("computedCop.computedHeatPower {heat_power:?}");

        let (heat_power, electrical_power) = (heat_power?, electrical_power?);
        if electrical_power == 0. {
            return None;
        }

        Some(round_to_2dp(heat_power / electrical_power))
    }

    /// COP as reported by the heat pumps themselves: their heat output over their power input.
    pub fn quatt_cop(&self, context: Option<&str>) -> Option<f64> {
        let (power_input, power_output) = match context {
            None => (Some(self.power_input(None)), Some(self.power(None))),
            Some(context) => (
                self.number(&format!("{context}.powerInput")),
                self.number(&format!("{context}.power")),
            ),
        };
        let label = context.unwrap_or_default();

        debug!("{label}.computedQuattCop.powerInput {power_input:?}");
        debug!("{label}.computedQuattCop.powerOutput {power_output:?}");

        let (power_input, power_output) = (power_input?, power_output?);
        if power_input == 0. {
            return None;
        }

        Some(without_negative_zero(round_to_2dp(power_output / power_input)))
    }

    /// Whether a heat pump is defrosting: the CIC wants heat from it, yet it delivers none and
    /// the water comes out more than 1 K colder than it went in.
    pub fn defrost(&self, context: Option<&str>) -> Option<bool> {
        let context = context?;

        let state = self.supervisory_control_code();
        let power_output = self.number(&format!("{context}.power"));
        let water_delta = self.water_delta(Some(context));

        debug!("{context}.computedDefrost.supervisoryControlMode {state:?}");
        debug!("{context}.computedDefrost.powerOutput {power_output:?}");
        debug!("{context}.computedDefrost.computedWaterDelta {water_delta:?}");

        let (state, power_output, water_delta) = (state?, power_output?, water_delta?);

        let heating = state.is_some_and(|code| heatpump_heating(code.trunc()));

        Some(heating && power_output == 0. && water_delta < -1.)
    }

    pub fn supervisory_control_mode(
        &self,
        _context: Option<&str>,
    ) -> Option<SupervisoryControlMode> {
        SupervisoryControlMode::from_code(self.supervisory_control_code()??)
    }
}
