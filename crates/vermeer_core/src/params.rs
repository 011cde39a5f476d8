//! Generation parameters parsed from a chat command.

use crate::parse_key_values;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Well-known parameter names.
pub mod keys {
    /// Text prompt sent to the image backend.
    pub const PROMPT: &str = "prompt";
    /// Images per request, or number of requests when generating separately.
    pub const BATCH_COUNT: &str = "batch_count";
    /// Split a batch into one request per image.
    pub const GENERATE_SEPARATELY: &str = "generate_separately";
    /// Rewrite the prompt through the prompt expander.
    pub const OPTIMIZE_PROMPT: &str = "optimize_prompt";
    /// Text prepended to the prompt before expansion.
    pub const PROMPT_PREFIX: &str = "prompt_prefix";
}

/// A single parameter value after best-effort numeric coercion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_more::From)]
#[serde(untagged)]
pub enum ParamValue {
    /// Parsed as an integer
    Int(i64),
    /// Parsed as a float
    Float(f64),
    /// Kept as text
    Text(String),
}

impl ParamValue {
    /// Coerces raw text: integer first, then float, otherwise the text itself.
    ///
    /// # Examples
    ///
    /// ```
    /// use vermeer_core::ParamValue;
    ///
    /// assert_eq!(ParamValue::coerce("5"), ParamValue::Int(5));
    /// assert_eq!(ParamValue::coerce("5.5"), ParamValue::Float(5.5));
    /// assert_eq!(ParamValue::coerce("abc"), ParamValue::Text("abc".to_string()));
    /// ```
    pub fn coerce(raw: &str) -> Self {
        if let Ok(int) = raw.parse::<i64>() {
            return Self::Int(int);
        }
        if let Ok(float) = raw.parse::<f64>() {
            return Self::Float(float);
        }
        Self::Text(raw.to_string())
    }

    /// Integer view of the value. Floats are truncated; text is not converted.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(value) => Some(*value),
            Self::Float(value) if value.is_finite() => Some(value.trunc() as i64),
            _ => None,
        }
    }

    /// Flag view of the value.
    ///
    /// Numbers are true when non-zero. Text is false for `false`, `no`,
    /// `off`, `0` and the empty string, true otherwise.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Int(value) => *value != 0,
            Self::Float(value) => *value != 0.0,
            Self::Text(text) => {
                let text = text.trim().to_ascii_lowercase();
                !matches!(text.as_str(), "" | "false" | "no" | "off" | "0")
            }
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl std::fmt::Display for ParamValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Int(value) => write!(f, "{}", value),
            // Debug keeps the fractional part: 5.0 stays "5.0".
            Self::Float(value) => write!(f, "{:?}", value),
            Self::Text(value) => write!(f, "{}", value),
        }
    }
}

/// Parameter mapping for one generation command.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GenerationParams(BTreeMap<String, ParamValue>);

impl GenerationParams {
    /// Creates an empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses `key: value` pairs without coercing them. Later keys win.
    pub fn parse(message: &str) -> Self {
        Self(
            parse_key_values(message)
                .into_iter()
                .map(|(key, value)| (key, ParamValue::Text(value)))
                .collect(),
        )
    }

    /// Applies numeric coercion to every top-level text value.
    pub fn coerce_numbers(self) -> Self {
        Self(
            self.0
                .into_iter()
                .map(|(key, value)| match value {
                    ParamValue::Text(text) => (key, ParamValue::coerce(&text)),
                    other => (key, other),
                })
                .collect(),
        )
    }

    /// Parses and coerces a command, defaulting `prompt` to the whole message.
    ///
    /// # Examples
    ///
    /// ```
    /// use vermeer_core::{GenerationParams, ParamValue};
    ///
    /// let params = GenerationParams::from_message("prompt: a cat batch_count: 3");
    /// assert_eq!(params.prompt(), "a cat");
    /// assert_eq!(params.get("batch_count"), Some(&ParamValue::Int(3)));
    ///
    /// let bare = GenerationParams::from_message("a cat on a mat");
    /// assert_eq!(bare.prompt(), "a cat on a mat");
    /// ```
    #[tracing::instrument(skip(message), fields(len = message.len()))]
    pub fn from_message(message: &str) -> Self {
        let mut params = Self::parse(message).coerce_numbers();
        if !params.contains(keys::PROMPT) {
            params.insert(keys::PROMPT, message);
        }
        tracing::debug!(keys = params.len(), "Parsed generation parameters");
        params
    }

    /// Looks up a parameter.
    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.0.get(key)
    }

    /// True when the parameter is present.
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Sets a parameter, replacing any previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) {
        self.0.insert(key.into(), value.into());
    }

    /// Number of parameters.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when no parameters are set.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Prompt text, rendered as text whatever its coerced type.
    pub fn prompt(&self) -> String {
        self.get(keys::PROMPT)
            .map(ToString::to_string)
            .unwrap_or_default()
    }

    /// Prefix prepended to the prompt before expansion.
    pub fn prompt_prefix(&self) -> String {
        self.get(keys::PROMPT_PREFIX)
            .map(ToString::to_string)
            .unwrap_or_default()
    }

    /// Requested batch size, at least 1.
    pub fn batch_count(&self) -> usize {
        let Some(value) = self.get(keys::BATCH_COUNT) else {
            return 1;
        };
        match value.as_int() {
            Some(count) if count >= 1 => count as usize,
            _ => {
                tracing::warn!(batch_count = %value, "Unusable batch_count, using 1");
                1
            }
        }
    }

    /// Whether each image should be its own request.
    pub fn generate_separately(&self) -> bool {
        self.flag(keys::GENERATE_SEPARATELY)
    }

    /// Whether the prompt should go through the expander.
    pub fn optimize_prompt(&self) -> bool {
        self.flag(keys::OPTIMIZE_PROMPT)
    }

    fn flag(&self, key: &str) -> bool {
        self.get(key).is_some_and(ParamValue::is_truthy)
    }

    /// Copy with the prompt replaced.
    pub fn with_prompt(&self, prompt: impl Into<String>) -> Self {
        let mut params = self.clone();
        params.insert(keys::PROMPT, ParamValue::Text(prompt.into()));
        params
    }

    /// Copy with the batch count replaced.
    pub fn with_batch_count(&self, count: i64) -> Self {
        let mut params = self.clone();
        params.insert(keys::BATCH_COUNT, ParamValue::Int(count));
        params
    }
}

impl FromIterator<(String, ParamValue)> for GenerationParams {
    fn from_iter<I: IntoIterator<Item = (String, ParamValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
