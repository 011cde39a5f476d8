//! Payload and help templating for the Vermeer bot.
//!
//! Built-in templates ship with the crate; deployments can point
//! [`TemplateConfig`] at their own files to target a different backend.

#![warn(missing_docs)]

mod config;
mod templater;

pub use config::TemplateConfig;
pub use templater::{GENERATION_TEMPLATE, HELP_TEMPLATE, MiniJinjaTemplater};
