//! Trait interfaces for the Vermeer bot.
//!
//! The orchestration core in `vermeer_bot` only depends on these traits.
//! Concrete implementations live in `vermeer_models` (HTTP backends),
//! `vermeer_template` (payload templating) and `vermeer_social` (chat).

#![warn(missing_docs)]

mod chat;
mod generation;

pub use chat::{ChatTransport, MessageHandle, ReplyChannel, SendOptions};
pub use generation::{ImageGenerator, PayloadTemplater, PromptExpander};
