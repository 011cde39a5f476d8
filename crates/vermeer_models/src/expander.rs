//! Prompt expansion over a text-generation HTTP backend.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};
use vermeer_error::{ExpansionError, ExpansionErrorKind, HttpError};
use vermeer_interface::PromptExpander;

use crate::ExpansionRequest;

/// Most variants requested per round-trip.
pub const MAX_SEQUENCES_PER_REQUEST: usize = 5;

/// Settings for the text-generation backend.
#[derive(
    Debug, Clone, PartialEq, Serialize, Deserialize, derive_getters::Getters, derive_setters::Setters,
)]
#[setters(prefix = "with_")]
#[serde(default)]
pub struct ExpanderConfig {
    /// Backend URL; expansion is skipped when unset
    #[setters(strip_option)]
    endpoint: Option<String>,
    /// Sampling temperature
    temperature: f64,
    /// Tokens sampled from at each step
    top_k: u32,
    /// Maximum output length
    max_length: u32,
    /// Penalty for repeated tokens
    repetition_penalty: f64,
    /// Per-request timeout in seconds
    timeout_secs: u64,
}

impl Default for ExpanderConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            temperature: 0.9,
            top_k: 80,
            max_length: 80,
            repetition_penalty: 1.2,
            timeout_secs: 60,
        }
    }
}

/// Sizes of the round-trips needed for `count` variants.
///
/// Every call asks for [`MAX_SEQUENCES_PER_REQUEST`] except the last, which
/// asks for the remainder.
///
/// ```
/// use vermeer_models::batch_sizes;
///
/// assert_eq!(batch_sizes(12), vec![5, 5, 2]);
/// assert_eq!(batch_sizes(10), vec![5, 5]);
/// assert!(batch_sizes(0).is_empty());
/// ```
pub fn batch_sizes(count: usize) -> Vec<usize> {
    let full = count / MAX_SEQUENCES_PER_REQUEST;
    let remainder = count % MAX_SEQUENCES_PER_REQUEST;
    let mut sizes = vec![MAX_SEQUENCES_PER_REQUEST; full];
    if remainder > 0 {
        sizes.push(remainder);
    }
    sizes
}

/// [`PromptExpander`] backed by an HTTP text-generation service.
#[derive(Debug, Clone)]
pub struct HttpPromptExpander {
    client: Client,
    endpoint: String,
    config: ExpanderConfig,
}

impl HttpPromptExpander {
    /// Build an expander posting to `endpoint`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(endpoint: impl Into<String>, config: ExpanderConfig) -> Result<Self, HttpError> {
        let endpoint = endpoint.into();
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| HttpError::new(format!("Failed to build HTTP client: {}", e)))?;

        debug!(endpoint = %endpoint, "Created prompt expander");
        Ok(Self {
            client,
            endpoint,
            config,
        })
    }

    /// Build an expander from configuration, or `None` when no endpoint is set.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn from_config(config: &ExpanderConfig) -> Result<Option<Self>, HttpError> {
        match &config.endpoint {
            Some(endpoint) => Self::new(endpoint.clone(), config.clone()).map(Some),
            None => {
                info!("No prompt expander endpoint configured");
                Ok(None)
            }
        }
    }

    /// Backend URL.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn fetch_sequences(
        &self,
        prompt: &str,
        count: usize,
    ) -> Result<Vec<String>, ExpansionError> {
        let request = ExpansionRequest::builder()
            .prompt(prompt)
            .temperature(self.config.temperature)
            .top_k(self.config.top_k)
            .max_length(self.config.max_length)
            .repetition_penalty(self.config.repetition_penalty)
            .num_return_sequences(count)
            .build()
            .map_err(|e| ExpansionErrorKind::InvalidResponse(format!("Bad request: {}", e)))?;

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                warn!(error = ?e, "Prompt expander unreachable");
                ExpansionErrorKind::Transport(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = status.as_u16(), body = %body, "Prompt expander refused request");
            return Err(ExpansionErrorKind::Status {
                status: status.as_u16(),
                body,
            }
            .into());
        }

        let body = response
            .text()
            .await
            .map_err(|e| ExpansionErrorKind::Transport(e.to_string()))?;
        let sequences: Vec<String> = serde_json::from_str(&body).map_err(|e| {
            error!(error = %e, "Prompt expander returned an unexpected body");
            ExpansionErrorKind::InvalidResponse(format!("Expected a list of strings: {}", e))
        })?;

        Ok(fit_to_count(sequences, count, prompt))
    }
}

/// Truncate or pad with `prompt` so exactly `count` entries remain.
fn fit_to_count(mut sequences: Vec<String>, count: usize, prompt: &str) -> Vec<String> {
    if sequences.len() != count {
        warn!(
            requested = count,
            received = sequences.len(),
            "Prompt expander returned a different number of variants"
        );
        sequences.resize(count, prompt.to_string());
    }
    sequences
}

#[async_trait]
impl PromptExpander for HttpPromptExpander {
    #[instrument(skip(self), fields(endpoint = %self.endpoint))]
    async fn expand(&self, base_prompt: &str, count: usize) -> Result<Vec<String>, ExpansionError> {
        let mut results = Vec::with_capacity(count);
        for size in batch_sizes(count) {
            let batch = self.fetch_sequences(base_prompt, size).await?;
            results.extend(batch);
        }

        debug!(variants = results.len(), "Prompt expansion complete");
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_sizes() {
        assert_eq!(batch_sizes(12), vec![5, 5, 2]);
        assert_eq!(batch_sizes(5), vec![5]);
        assert_eq!(batch_sizes(10), vec![5, 5]);
        assert_eq!(batch_sizes(1), vec![1]);
        assert!(batch_sizes(0).is_empty());
    }

    #[test]
    fn test_batch_sizes_sum_to_count() {
        for count in 0..40 {
            let sizes = batch_sizes(count);
            assert_eq!(sizes.iter().sum::<usize>(), count);
            assert_eq!(sizes.len(), count.div_ceil(MAX_SEQUENCES_PER_REQUEST));
            assert!(sizes.iter().all(|s| (1..=5).contains(s)));
        }
    }

    #[test]
    fn test_fit_to_count_pads_and_truncates() {
        let padded = fit_to_count(vec!["one".to_string()], 3, "base");
        assert_eq!(padded, vec!["one", "base", "base"]);

        let truncated = fit_to_count(vec!["a".into(), "b".into(), "c".into()], 2, "base");
        assert_eq!(truncated, vec!["a", "b"]);
    }

    #[test]
    fn test_default_config() {
        let config = ExpanderConfig::default();
        assert_eq!(*config.temperature(), 0.9);
        assert_eq!(*config.top_k(), 80);
        assert_eq!(*config.max_length(), 80);
        assert_eq!(*config.repetition_penalty(), 1.2);
        assert!(config.endpoint().is_none());
    }

    #[test]
    fn test_from_config_without_endpoint() {
        assert!(HttpPromptExpander::from_config(&ExpanderConfig::default())
            .unwrap()
            .is_none());
    }
}
