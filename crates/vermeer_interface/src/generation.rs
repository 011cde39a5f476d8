//! Traits for the generation pipeline collaborators.

use async_trait::async_trait;
use vermeer_core::{GenerationParams, ImageBatch, Payload};
use vermeer_error::{ExpansionError, TemplateError};

/// Turns one base prompt into several textual variants.
#[async_trait]
pub trait PromptExpander: Send + Sync {
    /// Return exactly `count` variants of `base_prompt`, in order.
    ///
    /// # Errors
    ///
    /// Transport failures are reported with
    /// [`ExpansionErrorKind::Transport`](vermeer_error::ExpansionErrorKind::Transport);
    /// backend refusals with
    /// [`ExpansionErrorKind::Status`](vermeer_error::ExpansionErrorKind::Status).
    async fn expand(&self, base_prompt: &str, count: usize) -> Result<Vec<String>, ExpansionError>;
}

/// Renders parameter mappings into request payloads and help text.
pub trait PayloadTemplater: Send + Sync {
    /// Render the request body for a parameter set.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering fails or the output is not a JSON object.
    fn render_payload(&self, params: &GenerationParams) -> Result<Payload, TemplateError>;

    /// Render the user-facing help document.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering fails.
    fn render_help(&self) -> Result<String, TemplateError>;
}

/// Fetches images for one payload.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Return the images for `payload`, or `None` when the backend failed.
    ///
    /// Never fails: transport problems are logged and reported as `None`.
    async fn fetch(&self, payload: &Payload) -> Option<ImageBatch>;
}
