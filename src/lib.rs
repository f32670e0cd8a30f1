mod compare_floats;
pub mod coordinator;
pub mod core;
pub mod errors;
pub mod output;
pub mod snapshot;
#[cfg(test)]
mod tests;

pub use crate::core::derived_metrics::DerivedMetrics;
pub use crate::core::electrical_power::{
    ElectricalPowerSource, FixedElectricalPower, HostPowerSensor, NoElectricalPower,
};
pub use crate::core::metrics::{ComputedMetric, MetricValue};
pub use crate::errors::QuattError;
pub use crate::snapshot::{ingest_snapshot, RawSnapshot};
use crate::output::Output;
use csv::WriterBuilder;
use serde_json::Value;
use std::io::Read;
use std::sync::LazyLock;
use tracing::{debug, info};

/// Location key the metrics report is written under.
pub const REPORT_LOCATION_KEY: &str = "metrics";

/// Which installations a report row applies to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Applicability {
    Always,
    Duo,
    OpenTherm,
}

#[derive(Debug)]
struct ReportRow {
    path: String,
    unit: &'static str,
    applicability: Applicability,
}

impl ReportRow {
    fn new(path: impl Into<String>, unit: &'static str, applicability: Applicability) -> Self {
        Self {
            path: path.into(),
            unit,
            applicability,
        }
    }
}

const HEATPUMP_READINGS: [(&str, &str); 11] = [
    ("getMainWorkingMode", ""),
    ("temperatureOutside", "[deg C]"),
    ("temperatureWaterIn", "[deg C]"),
    ("temperatureWaterOut", "[deg C]"),
    ("computedWaterDelta", "[deg C]"),
    ("powerInput", "[W]"),
    ("power", "[W]"),
    ("computedQuattCop", "[CoP]"),
    ("silentModeStatus", ""),
    ("limitedByCop", ""),
    ("computedDefrost", ""),
];

static REPORT_ROWS: LazyLock<Vec<ReportRow>> = LazyLock::new(|| {
    use Applicability::*;

    let mut rows = vec![
        ReportRow::new("time.tsHuman", "", Always),
        ReportRow::new("computedHeatPower", "[W]", Always),
        ReportRow::new("computedCop", "[CoP]", Always),
        ReportRow::new("computedPowerInput", "[W]", Always),
        ReportRow::new("computedPower", "[W]", Always),
        ReportRow::new("computedSystemPower", "[W]", Always),
        ReportRow::new("computedWaterDelta", "[deg C]", Always),
        ReportRow::new("computedQuattCop", "[CoP]", Always),
        ReportRow::new("qc.supervisoryControlMode", "", Always),
        ReportRow::new("qc.computedSupervisoryControlMode", "", Always),
        ReportRow::new("qc.flowRateFiltered", "[L/h]", Always),
        ReportRow::new("qc.stickyPumpProtectionEnabled", "", Always),
        ReportRow::new("flowMeter.waterSupplyTemperature", "[deg C]", Always),
        ReportRow::new("thermostat.otFtControlSetpoint", "[deg C]", Always),
        ReportRow::new("thermostat.otFtRoomSetpoint", "[deg C]", Always),
        ReportRow::new("thermostat.otFtRoomTemperature", "[deg C]", Always),
        ReportRow::new("thermostat.otFtChEnabled", "", Always),
        ReportRow::new("thermostat.otFtDhwEnabled", "", Always),
        ReportRow::new("thermostat.otFtCoolingEnabled", "", Always),
        ReportRow::new("system.hostName", "", Always),
    ];

    for (heatpump, applicability) in [("hp1", Always), ("hp2", Duo)] {
        rows.extend(HEATPUMP_READINGS.iter().map(|&(reading, unit)| {
            ReportRow::new(format!("{heatpump}.{reading}"), unit, applicability)
        }));
    }

    rows.extend([
        ReportRow::new("boiler.otFbSupplyInletTemperature", "[deg C]", OpenTherm),
        ReportRow::new("boiler.otFbSupplyOutletTemperature", "[deg C]", OpenTherm),
        ReportRow::new("boiler.computedBoilerHeatPower", "[W]", OpenTherm),
        ReportRow::new("boiler.otFbChModeActive", "", OpenTherm),
        ReportRow::new("boiler.otFbDhwActive", "", OpenTherm),
        ReportRow::new("boiler.otFbFlameOn", "", OpenTherm),
        ReportRow::new("boiler.otTbCH", "", OpenTherm),
        ReportRow::new("boiler.oTtbTurnOnOffBoilerOn", "", OpenTherm),
    ]);

    rows
});

/// One line of the metrics report.
#[derive(Clone, Debug, PartialEq)]
pub struct ReportLine {
    pub path: String,
    pub value: Option<Value>,
    pub unit: &'static str,
}

/// Evaluate every report row that applies to the installation `metrics` describes.
pub fn report(metrics: &DerivedMetrics<'_>) -> Vec<ReportLine> {
    let duo = metrics.heatpump2_active();
    let open_therm = metrics.boiler_open_therm();
    debug!("Building report (duo: {duo}, OpenTherm: {open_therm})");

    REPORT_ROWS
        .iter()
        .filter(|row| match row.applicability {
            Applicability::Always => true,
            Applicability::Duo => duo,
            Applicability::OpenTherm => open_therm,
        })
        .map(|row| ReportLine {
            path: row.path.clone(),
            value: metrics.get_value(&row.path, None),
            unit: row.unit,
        })
        .collect()
}

/// Ingest a snapshot from `input` and write the metrics report for it to `output`.
pub fn run_snapshot(
    input: impl Read,
    output: impl Output,
    electrical_power: &dyn ElectricalPowerSource,
) -> anyhow::Result<()> {
    let snapshot = ingest_snapshot(input)?;
    let metrics = DerivedMetrics::new(&snapshot, electrical_power);
    let lines = report(&metrics);

    if output.is_noop() {
        return Ok(());
    }

    info!("writing out to {REPORT_LOCATION_KEY}");
    write_report(&output, &lines)
}

fn write_report(output: &impl Output, lines: &[ReportLine]) -> anyhow::Result<()> {
    let writer = output.writer_for_location_key(REPORT_LOCATION_KEY)?;
    let mut writer = WriterBuilder::new().from_writer(writer);

    writer.write_record(["path", "value", "unit"])?;
    for line in lines {
        let value = line.value.as_ref().map(cell).unwrap_or_default();
        writer.write_record([line.path.as_str(), value.as_str(), line.unit])?;
    }
    writer.flush()?;

    Ok(())
}

fn cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
