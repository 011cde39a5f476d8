//! Template override paths.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Optional files replacing the built-in templates.
#[derive(
    Debug,
    Clone,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    derive_getters::Getters,
    derive_setters::Setters,
)]
#[setters(prefix = "with_")]
#[serde(default)]
pub struct TemplateConfig {
    /// Jinja template producing the request JSON
    #[setters(strip_option)]
    generation: Option<PathBuf>,
    /// Jinja template producing the MarkdownV2 help text
    #[setters(strip_option)]
    help: Option<PathBuf>,
}
