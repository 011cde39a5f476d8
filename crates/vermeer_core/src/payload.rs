//! Rendered request bodies for the image backend.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use vermeer_error::JsonError;

/// Fully rendered JSON request body for one image-generation call.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Payload(Map<String, Value>);

impl Payload {
    /// Wraps an already-built JSON object.
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Accepts any JSON value that is an object.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not a JSON object.
    #[track_caller]
    pub fn from_value(value: Value) -> Result<Self, JsonError> {
        match value {
            Value::Object(fields) => Ok(Self(fields)),
            other => Err(JsonError::new(format!(
                "payload must be a JSON object, got {}",
                other
            ))),
        }
    }

    /// Looks up a top-level field.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Prompt used for captions. Non-string prompts are rendered as JSON.
    pub fn prompt(&self) -> String {
        match self.0.get("prompt") {
            Some(Value::String(text)) => text.clone(),
            Some(other) => other.to_string(),
            None => String::new(),
        }
    }

    /// Compact JSON with object keys sorted at every level.
    ///
    /// Two payloads with the same content produce the same text regardless
    /// of field insertion order.
    pub fn canonical_json(&self) -> String {
        canonicalize(&Value::Object(self.0.clone())).to_string()
    }

    /// Indented JSON with sorted keys, for showing to users.
    pub fn to_pretty_json(&self) -> String {
        format!("{:#}", canonicalize(&Value::Object(self.0.clone())))
    }
}

fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(fields) => {
            let mut keys: Vec<&String> = fields.keys().collect();
            keys.sort();
            Value::Object(
                keys.into_iter()
                    .map(|key| (key.clone(), canonicalize(&fields[key])))
                    .collect(),
            )
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(value: Value) -> Payload {
        Payload::from_value(value).expect("object payload")
    }

    #[test]
    fn test_canonical_json_ignores_insertion_order() {
        let mut first = Map::new();
        first.insert("steps".into(), json!(20));
        first.insert("prompt".into(), json!("a cat"));
        first.insert("extra".into(), json!({"b": 1, "a": [{"y": 2, "x": 1}]}));

        let mut second = Map::new();
        second.insert("extra".into(), json!({"a": [{"x": 1, "y": 2}], "b": 1}));
        second.insert("prompt".into(), json!("a cat"));
        second.insert("steps".into(), json!(20));

        assert_eq!(
            Payload::new(first).canonical_json(),
            Payload::new(second).canonical_json()
        );
    }

    #[test]
    fn test_canonical_json_is_sorted_and_compact() {
        let p = payload(json!({"b": 1, "a": "x"}));
        assert_eq!(p.canonical_json(), r#"{"a":"x","b":1}"#);
    }

    #[test]
    fn test_prompt_rendering() {
        assert_eq!(payload(json!({"prompt": "a cat"})).prompt(), "a cat");
        assert_eq!(payload(json!({"prompt": 1984})).prompt(), "1984");
        assert_eq!(payload(json!({})).prompt(), "");
    }

    #[test]
    fn test_non_object_is_rejected() {
        assert!(Payload::from_value(json!([1, 2])).is_err());
        assert!(Payload::from_value(json!("prompt")).is_err());
    }
}
