//! HTTP backends for the Vermeer bot.
//!
//! - [`HttpPromptExpander`] asks a text-generation service for prompt
//!   variants, at most five per round-trip.
//! - [`GenerationClient`] posts rendered payloads to a txt2img service,
//!   consulting an [`ImageCache`](vermeer_cache::ImageCache) first.

#![warn(missing_docs)]

mod dto;
mod expander;
mod generation;

pub use dto::{ExpansionRequest, ExpansionRequestBuilder, GenerationResponse};
pub use expander::{ExpanderConfig, HttpPromptExpander, MAX_SEQUENCES_PER_REQUEST, batch_sizes};
pub use generation::{GenerationClient, GenerationConfig};
