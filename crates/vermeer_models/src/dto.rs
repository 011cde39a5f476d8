//! Wire types for the expansion and generation backends.

use derive_builder::Builder;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use vermeer_core::ImageBatch;

/// Request body for the text-generation backend.
#[derive(Debug, Clone, PartialEq, Serialize, Builder, Getters)]
#[builder(setter(into))]
pub struct ExpansionRequest {
    /// Seed text to expand
    prompt: String,
    /// Sampling temperature
    temperature: f64,
    /// Tokens sampled from at each step
    top_k: u32,
    /// Maximum output length
    max_length: u32,
    /// Penalty for repeated tokens
    repetition_penalty: f64,
    /// Number of variants in this round-trip
    num_return_sequences: usize,
}

impl ExpansionRequest {
    /// Creates a new builder for ExpansionRequest.
    pub fn builder() -> ExpansionRequestBuilder {
        ExpansionRequestBuilder::default()
    }
}

/// Response body of the image-generation backend.
///
/// Only `images` is read; other fields (`parameters`, `info`) are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerationResponse {
    /// Base64 images, possibly with nulls
    #[serde(default)]
    pub images: Option<Vec<Option<String>>>,
}

impl GenerationResponse {
    /// Images as a batch. A missing field becomes a single placeholder.
    pub fn into_batch(self) -> ImageBatch {
        match self.images {
            Some(images) => ImageBatch::new(images),
            None => ImageBatch::placeholder(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_expansion_request_wire_format() {
        let request = ExpansionRequest::builder()
            .prompt("a cat")
            .temperature(0.9)
            .top_k(80u32)
            .max_length(80u32)
            .repetition_penalty(1.2)
            .num_return_sequences(5usize)
            .build()
            .unwrap();

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "prompt": "a cat",
                "temperature": 0.9,
                "top_k": 80,
                "max_length": 80,
                "repetition_penalty": 1.2,
                "num_return_sequences": 5
            })
        );
    }

    #[test]
    fn test_missing_images_is_placeholder() {
        let response: GenerationResponse =
            serde_json::from_value(json!({"info": "{}"})).unwrap();
        assert_eq!(response.into_batch(), ImageBatch::placeholder());
    }

    #[test]
    fn test_images_with_nulls_preserved() {
        let response: GenerationResponse =
            serde_json::from_value(json!({"images": ["aGk=", null]})).unwrap();
        let batch = response.into_batch();
        assert_eq!(batch.entries(), &[Some("aGk=".to_string()), None]);
    }
}
