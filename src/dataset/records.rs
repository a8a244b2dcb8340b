//! Record list normalization

use crate::error::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

/// Unwrap a record list.
///
/// Producers emit either a bare array or `{"records": [...]}`. Anything else
/// yields an empty list rather than an error.
pub fn normalize_records(parsed: &Value) -> Vec<Value> {
    record_items(parsed).to_vec()
}

fn record_items(parsed: &Value) -> &[Value] {
    match parsed {
        Value::Array(items) => items,
        Value::Object(map) => match map.get("records") {
            Some(Value::Array(items)) => items,
            _ => &[],
        },
        _ => &[],
    }
}

/// Normalize and deserialize every record into `T`.
///
/// A record that does not fit `T` fails the whole list with `MalformedJson`.
pub fn parse_records<T: DeserializeOwned>(parsed: &Value) -> Result<Vec<T>> {
    record_items(parsed)
        .iter()
        .enumerate()
        .map(|(idx, item)| {
            T::deserialize(item)
                .map_err(|e| Error::MalformedJson(format!("record {}: {}", idx, e)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{CharFrequencyRecord, SummaryRecord};
    use serde_json::json;

    #[test]
    fn test_bare_array() {
        assert_eq!(normalize_records(&json!([{"a": 1}])), vec![json!({"a": 1})]);
    }

    #[test]
    fn test_wrapped_records() {
        assert_eq!(
            normalize_records(&json!({"records": [{"a": 1}]})),
            vec![json!({"a": 1})]
        );
    }

    #[test]
    fn test_unrecognized_shapes_are_empty() {
        assert!(normalize_records(&json!({})).is_empty());
        assert!(normalize_records(&Value::Null).is_empty());
        assert!(normalize_records(&json!({"records": "nope"})).is_empty());
        assert!(normalize_records(&json!(42)).is_empty());
        assert!(normalize_records(&json!("text")).is_empty());
    }

    #[test]
    fn test_order_preserved() {
        let records: Vec<CharFrequencyRecord> = parse_records(&json!([
            {"char": "的", "freq": 30},
            {"char": "之", "freq": 20},
            {"char": "人", "freq": 20}
        ]))
        .unwrap();

        let chars: Vec<&str> = records.iter().map(|r| r.char.as_str()).collect();
        assert_eq!(chars, vec!["的", "之", "人"]);
    }

    #[test]
    fn test_parse_wrapped_summary() {
        let records: Vec<SummaryRecord> = parse_records(&json!({
            "records": [{
                "char": "之",
                "left_cohesion_count": 2,
                "right_cohesion_count": 5,
                "total_cohesion": 7
            }]
        }))
        .unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].total_cohesion, 7);
    }

    #[test]
    fn test_bad_record_is_malformed_json() {
        let result: Result<Vec<CharFrequencyRecord>> =
            parse_records(&json!([{"char": "的", "freq": 1}, {"char": "之"}]));

        match result {
            Err(Error::MalformedJson(msg)) => assert!(msg.starts_with("record 1")),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_empty_object_parses_empty() {
        let records: Vec<CharFrequencyRecord> = parse_records(&json!({})).unwrap();
        assert!(records.is_empty());
    }
}
