//! Flattening of nested JSON records into single-level maps.
//!
//! Nested object keys and array indices are joined with `_`
//! (`{"a": {"b": [1, 2]}}` becomes `{"a_b_0": 1, "a_b_1": 2}`). Empty nested
//! containers produce no keys.

use serde_json::{Map, Value};

/// Flatten every element of a record array.
///
/// Accepts either a top-level array or an object holding a `wines` array; any
/// other shape yields no records.
pub fn flatten_records(document: &Value) -> Vec<Map<String, Value>> {
    let records: &[Value] = match document {
        Value::Array(items) => items.as_slice(),
        Value::Object(map) => match map.get("wines") {
            Some(Value::Array(items)) => items.as_slice(),
            _ => &[],
        },
        _ => &[],
    };

    records.iter().map(flatten_record).collect()
}

/// Flatten one record. A scalar record becomes a single `value` entry.
pub fn flatten_record(record: &Value) -> Map<String, Value> {
    let mut out = Map::new();
    match record {
        Value::Object(map) => {
            for (key, value) in map {
                flatten_into(key, value, &mut out);
            }
        }
        Value::Array(items) => {
            for (index, value) in items.iter().enumerate() {
                flatten_into(&index.to_string(), value, &mut out);
            }
        }
        scalar => {
            out.insert("value".to_string(), scalar.clone());
        }
    }
    out
}

fn flatten_into(prefix: &str, value: &Value, out: &mut Map<String, Value>) {
    match value {
        Value::Object(map) => {
            for (key, nested) in map {
                flatten_into(&format!("{prefix}_{key}"), nested, out);
            }
        }
        Value::Array(items) => {
            for (index, nested) in items.iter().enumerate() {
                flatten_into(&format!("{prefix}_{index}"), nested, out);
            }
        }
        scalar => {
            out.insert(prefix.to_string(), scalar.clone());
        }
    }
}
