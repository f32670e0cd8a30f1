use crate::core::derived_metrics::DerivedMetrics;
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use std::sync::LazyLock;
use strum::{EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

/// Path segments naming a derivation all start with this prefix.
pub(crate) const COMPUTED_PREFIX: &str = "computed";

/// A derivation takes the path consumed before it was reached (if any) as its context.
pub type Derivation = fn(&DerivedMetrics<'_>, Option<&str>) -> Option<MetricValue>;

#[derive(Clone, Copy, Debug, EnumIter, EnumString, Eq, Hash, IntoStaticStr, PartialEq)]
pub enum ComputedMetric {
    #[strum(serialize = "computedWaterDelta")]
    WaterDelta,
    #[strum(serialize = "computedHeatPower")]
    HeatPower,
    #[strum(serialize = "computedBoilerHeatPower")]
    BoilerHeatPower,
    #[strum(serialize = "computedSystemPower")]
    SystemPower,
    #[strum(serialize = "computedPowerInput")]
    PowerInput,
    #[strum(serialize = "computedPower")]
    Power,
    #[strum(serialize = "computedCop")]
    Cop,
    #[strum(serialize = "computedQuattCop")]
    QuattCop,
    #[strum(serialize = "computedDefrost")]
    Defrost,
    #[strum(serialize = "computedSupervisoryControlMode")]
    SupervisoryControlMode,
}

impl ComputedMetric {
    pub fn name(&self) -> &'static str {
        self.into()
    }

    fn derivation(self) -> Derivation {
        match self {
            Self::WaterDelta => |metrics, context| {
                metrics.water_delta(context).map(MetricValue::Number)
            },
            Self::HeatPower => |metrics, context| {
                metrics.heat_power(context).map(MetricValue::Number)
            },
            Self::BoilerHeatPower => |metrics, context| {
                metrics.boiler_heat_power(context).map(MetricValue::Number)
            },
            Self::SystemPower => |metrics, context| {
                metrics.system_power(context).map(MetricValue::Number)
            },
            Self::PowerInput => |metrics, context| {
                Some(MetricValue::Number(metrics.power_input(context)))
            },
            Self::Power => |metrics, context| Some(MetricValue::Number(metrics.power(context))),
            Self::Cop => |metrics, context| metrics.cop(context).map(MetricValue::Number),
            Self::QuattCop => |metrics, context| {
                metrics.quatt_cop(context).map(MetricValue::Number)
            },
            Self::Defrost => |metrics, context| metrics.defrost(context).map(MetricValue::Flag),
            Self::SupervisoryControlMode => |metrics, context| {
                metrics
                    .supervisory_control_mode(context)
                    .map(|mode| MetricValue::Text(mode.text()))
            },
        }
    }

    pub fn evaluate(self, metrics: &DerivedMetrics<'_>, context: Option<&str>) -> Option<MetricValue> {
        (self.derivation())(metrics, context)
    }
}

/// Metric names to derivations, resolved once.
static DERIVATIONS: LazyLock<IndexMap<&'static str, Derivation>> = LazyLock::new(|| {
    ComputedMetric::iter()
        .map(|metric| (metric.name(), metric.derivation()))
        .collect()
});

/// Find the derivation a path segment names, if it names one.
///
/// Segments that merely look like a computed metric but are not in the table are left to be
/// looked up as plain keys.
pub(crate) fn derivation_for_segment(segment: &str) -> Option<Derivation> {
    if segment.len() <= COMPUTED_PREFIX.len() || !segment.starts_with(COMPUTED_PREFIX) {
        return None;
    }

    DERIVATIONS.get(segment).copied()
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MetricValue {
    Number(f64),
    Flag(bool),
    Text(&'static str),
}

impl MetricValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            MetricValue::Number(number) => Some(*number),
            MetricValue::Flag(_) | MetricValue::Text(_) => None,
        }
    }
}

impl From<MetricValue> for Value {
    fn from(value: MetricValue) -> Self {
        match value {
            MetricValue::Number(number) => Value::from(number),
            MetricValue::Flag(flag) => Value::Bool(flag),
            MetricValue::Text(text) => Value::String(text.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;
    use serde_json::json;
    use std::str::FromStr;

    #[rstest]
    fn should_have_a_derivation_for_every_metric() {
        assert_eq!(DERIVATIONS.len(), ComputedMetric::iter().count());
        for metric in ComputedMetric::iter() {
            assert!(derivation_for_segment(metric.name()).is_some(), "{metric:?}");
        }
    }

    #[rstest]
    #[case("computedWaterDelta", ComputedMetric::WaterDelta)]
    #[case("computedQuattCop", ComputedMetric::QuattCop)]
    #[case("computedSupervisoryControlMode", ComputedMetric::SupervisoryControlMode)]
    fn should_parse_metric_names(#[case] name: &str, #[case] expected: ComputedMetric) {
        assert_eq!(ComputedMetric::from_str(name).unwrap(), expected);
        assert_eq!(expected.name(), name);
    }

    #[rstest]
    #[case("computed")]
    #[case("computedSomethingElse")]
    #[case("temperatureWaterOut")]
    #[case("hp1")]
    #[case("ComputedCop")]
    fn should_not_find_derivation_for_other_segments(#[case] segment: &str) {
        assert!(derivation_for_segment(segment).is_none());
    }

    #[rstest]
    #[case(MetricValue::Number(5768.04), json!(5768.04))]
    #[case(MetricValue::Flag(true), json!(true))]
    #[case(MetricValue::Text("Standby"), json!("Standby"))]
    fn should_convert_to_json(#[case] value: MetricValue, #[case] expected: Value) {
        assert_eq!(Value::from(value), expected);
        assert_eq!(serde_json::to_value(value).unwrap(), expected);
    }
}
