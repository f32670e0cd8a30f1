use crate::errors::QuattError;
use serde_json::{Map, Value};
use std::io::{BufReader, Read};

pub fn ingest_snapshot(json: impl Read) -> Result<RawSnapshot, QuattError> {
    let reader = BufReader::new(json);
    let value: Value = serde_json::from_reader(reader)?;

    RawSnapshot::try_from(value)
}

/// One poll cycle's complete set of raw readings from the CIC controller.
///
/// The root is always a mapping, partitioned into sections such as `hp1`, `hp2`, `boiler`,
/// `thermostat`, `qc`, `flowMeter`, `time` and `system`. Apart from that the structure is
/// opaque and is only ever addressed by path.
#[derive(Clone, Debug, PartialEq)]
pub struct RawSnapshot {
    root: Value,
}

impl RawSnapshot {
    pub fn root(&self) -> &Value {
        &self.root
    }

    pub fn sections(&self) -> impl Iterator<Item = &str> {
        self.root
            .as_object()
            .into_iter()
            .flat_map(|sections| sections.keys().map(String::as_str))
    }
}

impl Default for RawSnapshot {
    fn default() -> Self {
        Self::from(Map::new())
    }
}

impl TryFrom<Value> for RawSnapshot {
    type Error = QuattError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(_) => Ok(Self { root: value }),
            other => Err(QuattError::SnapshotNotAMapping(json_type_name(&other))),
        }
    }
}

impl From<Map<String, Value>> for RawSnapshot {
    fn from(sections: Map<String, Value>) -> Self {
        Self {
            root: Value::Object(sections),
        }
    }
}

pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a mapping",
    }
}

/// Read a raw value as a number the way the controller's readings are meant to be read:
/// numbers as-is, booleans as 1 or 0, and strings when they parse as a finite number.
pub(crate) fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::Bool(flag) => Some(if *flag { 1. } else { 0. }),
        Value::String(text) => text
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|number| number.is_finite()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;
    use serde_json::json;
    use std::io::Cursor;

    #[rstest]
    fn should_ingest_mapping_snapshot() {
        let snapshot = ingest_snapshot(Cursor::new(
            r#"{"hp1": {"power": 1500}, "qc": {"supervisoryControlMode": 2}}"#,
        ))
        .unwrap();

        assert_eq!(snapshot.sections().collect::<Vec<_>>(), vec!["hp1", "qc"]);
        assert_eq!(snapshot.root()["hp1"]["power"], json!(1500));
    }

    #[rstest]
    fn should_reject_snapshot_that_is_not_json() {
        let result = ingest_snapshot(Cursor::new("hp1.power=1500"));

        assert!(matches!(result, Err(QuattError::InvalidSnapshot(_))));
    }

    #[rstest]
    #[case(json!([1, 2, 3]), "a list")]
    #[case(json!(null), "null")]
    #[case(json!("hp1"), "a string")]
    fn should_reject_snapshot_root_that_is_not_a_mapping(
        #[case] root: Value,
        #[case] expected_type: &str,
    ) {
        match RawSnapshot::try_from(root) {
            Err(QuattError::SnapshotNotAMapping(type_name)) => {
                assert_eq!(type_name, expected_type)
            }
            other => panic!("expected SnapshotNotAMapping, got {other:?}"),
        }
    }

    #[test]
    fn should_default_to_empty_snapshot() {
        let snapshot = RawSnapshot::default();

        assert_eq!(snapshot.sections().count(), 0);
    }

    #[rstest]
    #[case(json!(1500), Some(1500.))]
    #[case(json!(-2.5), Some(-2.5))]
    #[case(json!("21.5"), Some(21.5))]
    #[case(json!(true), Some(1.))]
    #[case(json!("unavailable"), None)]
    #[case(json!("NaN"), None)]
    #[case(json!("-inf"), None)]
    #[case(json!(null), None)]
    #[case(json!([1]), None)]
    fn should_read_numbers_leniently(#[case] value: Value, #[case] expected: Option<f64>) {
        assert_eq!(as_number(&value), expected);
    }
}
