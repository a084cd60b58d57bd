use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The stored record: `{"state": <json>, "version": <u32>}`.
///
/// A missing version reads as 0.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub state: Value,
    #[serde(default)]
    pub version: u32,
}

/// Shallow-merge `persisted` over `defaults`.
///
/// For object states persisted fields win and absent fields keep their
/// default. Any other shape replaces the default wholesale.
pub(crate) fn merge_over(defaults: Value, persisted: Value) -> Value {
    match (defaults, persisted) {
        (Value::Object(mut base), Value::Object(fields)) => {
            for (key, value) in fields {
                base.insert(key, value);
            }
            Value::Object(base)
        }
        (_, persisted) => persisted,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn version_defaults_to_zero() {
        let envelope: Envelope = serde_json::from_str(r#"{"state":{"count":1}}"#).unwrap();
        assert_eq!(envelope.version, 0);
        assert_eq!(envelope.state, json!({"count": 1}));
    }

    #[test]
    fn persisted_fields_win() {
        let merged = merge_over(json!({"a": 1, "b": 2}), json!({"b": 3}));
        assert_eq!(merged, json!({"a": 1, "b": 3}));
    }

    #[test]
    fn non_object_replaces() {
        assert_eq!(merge_over(json!(1), json!(5)), json!(5));
    }
}
