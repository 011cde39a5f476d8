//! Core data types for the Vermeer image-generation bot.
//!
//! This crate provides the data model shared by every other crate: command
//! parameters and their parsing, rendered payloads, image batches, per-request
//! results, and chat identifiers.

#![warn(missing_docs)]

mod chat;
mod image;
mod media;
mod observability;
mod params;
mod parser;
mod payload;
mod result;

pub use chat::{ChatId, IncomingMessage, MessageId, ParseMode};
pub use image::ImageBatch;
pub use media::MediaPhoto;
pub use observability::{LogFormat, init_tracing};
pub use params::{GenerationParams, ParamValue, keys};
pub use parser::parse_key_values;
pub use payload::Payload;
pub use result::GenerationResult;
