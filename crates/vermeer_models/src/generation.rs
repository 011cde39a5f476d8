//! Cache-checked client for the image-generation backend.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument, warn};
use vermeer_cache::{CacheKey, ImageCache};
use vermeer_core::{ImageBatch, Payload};
use vermeer_error::HttpError;
use vermeer_interface::ImageGenerator;

use crate::GenerationResponse;

/// Settings for the image-generation backend.
#[derive(
    Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters, derive_setters::Setters,
)]
#[setters(prefix = "with_")]
#[serde(default)]
pub struct GenerationConfig {
    /// txt2img URL
    endpoint: String,
    /// Per-request timeout in seconds
    timeout_secs: u64,
    /// Largest `batch_count` a single command may request
    max_batch_count: usize,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:7860/sdapi/v1/txt2img".to_string(),
            timeout_secs: 600,
            max_batch_count: 100,
        }
    }
}

/// [`ImageGenerator`] that consults a cache before posting to the backend.
///
/// Identical payloads (after canonicalization) reach the backend once; later
/// requests are served from the cache. Backend failures are logged and
/// reported as `None`, and are not cached.
#[derive(Clone)]
pub struct GenerationClient {
    client: Client,
    endpoint: String,
    cache: Arc<dyn ImageCache>,
}

impl std::fmt::Debug for GenerationClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationClient")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl GenerationClient {
    /// Build a client for the configured endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: &GenerationConfig, cache: Arc<dyn ImageCache>) -> Result<Self, HttpError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| HttpError::new(format!("Failed to build HTTP client: {}", e)))?;

        debug!(endpoint = %config.endpoint, "Created generation client");
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            cache,
        })
    }

    /// Backend URL.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn post(&self, payload: &Payload) -> Result<ImageBatch, HttpError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(payload)
            .send()
            .await
            .map_err(|e| HttpError::new(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(HttpError::with_status(status.as_u16(), body));
        }

        let parsed: GenerationResponse = response
            .json()
            .await
            .map_err(|e| HttpError::new(format!("Failed to parse JSON: {}", e)))?;
        Ok(parsed.into_batch())
    }
}

#[async_trait]
impl ImageGenerator for GenerationClient {
    #[instrument(skip(self, payload), fields(cache_key = tracing::field::Empty))]
    async fn fetch(&self, payload: &Payload) -> Option<ImageBatch> {
        let key = CacheKey::from_payload(payload);
        tracing::Span::current().record("cache_key", tracing::field::display(&key));

        match self.cache.get(&key).await {
            Ok(Some(batch)) => {
                debug!("Serving images from cache");
                return Some(batch);
            }
            Ok(None) => {}
            Err(e) => warn!(error = %e, "Cache read failed, treating as miss"),
        }

        let batch = match self.post(payload).await {
            Ok(batch) => batch,
            Err(e) => {
                error!(error = %e, "Failed to send request");
                return None;
            }
        };

        if let Err(e) = self.cache.set(&key, &batch).await {
            warn!(error = %e, "Cache write failed");
        }

        debug!(images = batch.images().count(), "Generation complete");
        Some(batch)
    }
}
