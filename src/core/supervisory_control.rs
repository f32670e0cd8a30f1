use strum::{Display, IntoStaticStr};

/// The state the CIC's supervisory controller reports through `qc.supervisoryControlMode`,
/// which decides which heat sources are running.
#[derive(Clone, Copy, Debug, Display, Eq, IntoStaticStr, PartialEq)]
pub enum SupervisoryControlMode {
    #[strum(serialize = "Standby")]
    Standby,
    #[strum(serialize = "Standby - heating")]
    StandbyHeating,
    #[strum(serialize = "Heating - heatpump only")]
    HeatingHeatpumpOnly,
    #[strum(serialize = "Heating - heatpump + boiler")]
    HeatingHeatpumpAndBoiler,
    #[strum(serialize = "Heating - boiler only")]
    HeatingBoilerOnly,
    #[strum(serialize = "Anti-freeze protection - boiler on")]
    AntiFreezeBoilerOn,
    #[strum(serialize = "Anti-freeze protection - boiler pre-pump")]
    AntiFreezeBoilerPrePump,
    #[strum(serialize = "Anti-freeze protection - water circulation")]
    AntiFreezeWaterCirculation,
    #[strum(serialize = "Fault - circulation pump on")]
    FaultCirculationPumpOn,
    /// Any code from 100 upwards.
    #[strum(serialize = "Commissioning modes")]
    Commissioning,
}

impl SupervisoryControlMode {
    /// Codes 5 to 95 are not assigned and give `None`, as do fractional codes below 100.
    pub fn from_code(code: f64) -> Option<Self> {
        if code >= 100. {
            return Some(Self::Commissioning);
        }
        if code.fract() != 0. {
            return None;
        }

        match code as i64 {
            0 => Some(Self::Standby),
            1 => Some(Self::StandbyHeating),
            2 => Some(Self::HeatingHeatpumpOnly),
            3 => Some(Self::HeatingHeatpumpAndBoiler),
            4 => Some(Self::HeatingBoilerOnly),
            96 => Some(Self::AntiFreezeBoilerOn),
            97 => Some(Self::AntiFreezeBoilerPrePump),
            98 => Some(Self::AntiFreezeWaterCirculation),
            99 => Some(Self::FaultCirculationPumpOn),
            _ => None,
        }
    }

    pub fn text(&self) -> &'static str {
        self.into()
    }
}

/// Whether the code says the heat pump is delivering heat (codes 2 and 3).
pub(crate) fn heatpump_heating(code: f64) -> bool {
    code == 2. || code == 3.
}

/// Whether the code says the boiler is delivering heat (codes 3 and 4).
pub(crate) fn boiler_heating(code: f64) -> bool {
    code == 3. || code == 4.
}
