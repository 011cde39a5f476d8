//! Turns a parsed command into the ordered list of request payloads.

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};
use vermeer_core::{GenerationParams, Payload};
use vermeer_error::{ExpansionError, VermeerResult};
use vermeer_interface::{PayloadTemplater, PromptExpander};

/// Largest `batch_count` planned when none is configured.
pub const DEFAULT_MAX_BATCH_COUNT: usize = 100;

/// Remove characters that would break the rendered request.
pub fn sanitize_prompt(text: &str) -> String {
    text.replace('"', "")
}

/// Seed text for the expander: prefix and prompt joined by one space.
pub fn base_prompt(params: &GenerationParams) -> String {
    format!("{} {}", params.prompt_prefix(), params.prompt())
}

/// Plans the payloads for one generation session.
///
/// | `optimize_prompt` | `generate_separately` | payloads |
/// |---|---|---|
/// | yes | yes | `batch_count`, one expanded prompt each, `batch_count: 1` |
/// | yes | no | 1, expanded prompt, original `batch_count` |
/// | no | yes | `batch_count`, same prompt, `batch_count: 1` |
/// | no | no | 1, parameters unchanged |
///
/// A `batch_count` above the planner's maximum is clamped to it first.
#[derive(Clone)]
pub struct PayloadPlanner {
    templater: Arc<dyn PayloadTemplater>,
    expander: Option<Arc<dyn PromptExpander>>,
    max_batch_count: usize,
}

impl std::fmt::Debug for PayloadPlanner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PayloadPlanner")
            .field("expander", &self.expander.is_some())
            .field("max_batch_count", &self.max_batch_count)
            .finish_non_exhaustive()
    }
}

impl PayloadPlanner {
    /// Planner rendering through `templater`, expanding prompts with
    /// `expander` when one is available.
    pub fn new(
        templater: Arc<dyn PayloadTemplater>,
        expander: Option<Arc<dyn PromptExpander>>,
    ) -> Self {
        Self {
            templater,
            expander,
            max_batch_count: DEFAULT_MAX_BATCH_COUNT,
        }
    }

    /// Cap on the number of images one command may request. Zero is
    /// treated as one.
    pub fn with_max_batch_count(mut self, max: usize) -> Self {
        self.max_batch_count = max.max(1);
        self
    }

    /// Cap on the number of images one command may request.
    pub fn max_batch_count(&self) -> usize {
        self.max_batch_count
    }

    /// Parse, coerce and plan a raw command argument.
    ///
    /// # Errors
    ///
    /// See [`plan`](Self::plan).
    #[instrument(skip(self))]
    pub async fn plan_message(&self, text: &str) -> VermeerResult<Vec<Payload>> {
        let params = GenerationParams::from_message(text);
        self.plan(&params).await
    }

    /// Plan the payloads for `params`.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering fails or the expander refuses the
    /// request. An unreachable expander is not an error: the base prompt is
    /// used instead.
    #[instrument(skip(self, params), fields(
        batch_count = params.batch_count(),
        optimize = params.optimize_prompt(),
        separate = params.generate_separately(),
    ))]
    pub async fn plan(&self, params: &GenerationParams) -> VermeerResult<Vec<Payload>> {
        let clamped;
        let params = if params.batch_count() > self.max_batch_count {
            warn!(
                requested = params.batch_count(),
                max = self.max_batch_count,
                "batch_count over limit, clamping"
            );
            clamped =
                params.with_batch_count(i64::try_from(self.max_batch_count).unwrap_or(i64::MAX));
            &clamped
        } else {
            params
        };
        let batch_count = params.batch_count();

        let payloads = match (params.optimize_prompt(), params.generate_separately()) {
            (true, true) => {
                let prompts = self.optimize_prompts(params, batch_count).await?;
                prompts
                    .into_iter()
                    .map(|prompt| {
                        self.templater
                            .render_payload(&params.with_prompt(prompt).with_batch_count(1))
                    })
                    .collect::<Result<Vec<_>, _>>()?
            }
            (true, false) => {
                let prompts = self.optimize_prompts(params, 1).await?;
                let prompt = prompts.into_iter().next().unwrap_or_else(|| base_prompt(params));
                vec![self.templater.render_payload(&params.with_prompt(prompt))?]
            }
            (false, true) => {
                let payload = self.templater.render_payload(&params.with_batch_count(1))?;
                vec![payload; batch_count]
            }
            (false, false) => vec![self.templater.render_payload(params)?],
        };

        debug!(payloads = payloads.len(), "Planned generation");
        Ok(payloads)
    }

    async fn optimize_prompts(
        &self,
        params: &GenerationParams,
        count: usize,
    ) -> Result<Vec<String>, ExpansionError> {
        let base = base_prompt(params);

        let generated = match &self.expander {
            Some(expander) => match expander.expand(&base, count).await {
                Ok(texts) => texts,
                Err(e) if e.is_transport() => {
                    warn!(error = %e, "Prompt expander unavailable, using base prompt");
                    vec![base.clone(); count]
                }
                Err(e) => return Err(e),
            },
            None => vec![base.clone(); count],
        };

        let sanitized: Vec<String> = generated.iter().map(|t| sanitize_prompt(t)).collect();
        info!(base = %base, prompts = ?sanitized, "Generated enhanced prompts");
        Ok(sanitized)
    }
}
