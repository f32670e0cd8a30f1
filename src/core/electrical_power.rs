use std::fmt::Debug;

/// States a host platform reports for a sensor it currently has no reading for.
const STATE_UNAVAILABLE: &str = "unavailable";
const STATE_UNKNOWN: &str = "unknown";

/// Sensor ids this short are treated as "no sensor configured".
const MIN_SENSOR_ID_LENGTH: usize = 7;

/// Supplies the instantaneous electrical power (W) the heat pumps draw, as measured by a meter
/// outside the CIC. This is what the COP is calculated against.
pub trait ElectricalPowerSource: Debug {
    fn electrical_power(&self) -> Option<f64>;
}

/// No external meter is configured, so COP cannot be calculated.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoElectricalPower;

impl ElectricalPowerSource for NoElectricalPower {
    fn electrical_power(&self) -> Option<f64> {
        None
    }
}

/// A fixed reading, e.g. one passed on the command line.
#[derive(Clone, Copy, Debug)]
pub struct FixedElectricalPower(pub f64);

impl ElectricalPowerSource for FixedElectricalPower {
    fn electrical_power(&self) -> Option<f64> {
        Some(self.0)
    }
}

impl<T: ElectricalPowerSource + ?Sized> ElectricalPowerSource for &T {
    fn electrical_power(&self) -> Option<f64> {
        (**self).electrical_power()
    }
}

impl<T: ElectricalPowerSource + ?Sized> ElectricalPowerSource for Box<T> {
    fn electrical_power(&self) -> Option<f64> {
        (**self).electrical_power()
    }
}

/// A power sensor owned by the host platform, looked up by id whenever a reading is needed.
///
/// `states` returns the sensor's current textual state, or `None` if the host has no such
/// sensor.
pub struct HostPowerSensor<F: Fn(&str) -> Option<String>> {
    sensor_id: Option<String>,
    states: F,
}

impl<F: Fn(&str) -> Option<String>> HostPowerSensor<F> {
    pub fn new(sensor_id: &str, states: F) -> Self {
        Self {
            sensor_id: (sensor_id.len() >= MIN_SENSOR_ID_LENGTH).then(|| sensor_id.to_string()),
            states,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.sensor_id.is_some()
    }
}

impl<F: Fn(&str) -> Option<String>> Debug for HostPowerSensor<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostPowerSensor")
            .field("sensor_id", &self.sensor_id)
            .finish_non_exhaustive()
    }
}

impl<F: Fn(&str) -> Option<String>> ElectricalPowerSource for HostPowerSensor<F> {
    fn electrical_power(&self) -> Option<f64> {
        let sensor_id = self.sensor_id.as_deref()?;
        let state = (self.states)(sensor_id)?;
        tracing::debug!("electricalPower {sensor_id} {state}");

        parse_power_state(&state)
    }
}

pub(crate) fn parse_power_state(state: &str) -> Option<f64> {
    match state.trim() {
        STATE_UNAVAILABLE | STATE_UNKNOWN => None,
        state => state.parse::<f64>().ok().filter(|power| power.is_finite()),
    }
}
