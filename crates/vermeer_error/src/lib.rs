//! Error types for the Vermeer image-generation bot.
//!
//! Every error carries the file and line where it was created. Area errors
//! (HTTP, storage, templating, chat, ...) convert into [`VermeerError`] so
//! session-level code can use a single result type.

#![warn(missing_docs)]

mod chat;
mod config;
mod expansion;
mod http;
mod json;
mod storage;
mod template;

pub use chat::{ChatError, ChatErrorKind, ChatResult};
pub use config::{ConfigError, ConfigErrorKind};
pub use expansion::{ExpansionError, ExpansionErrorKind};
pub use http::HttpError;
pub use json::JsonError;
pub use storage::{StorageError, StorageErrorKind, StorageResult};
pub use template::{TemplateError, TemplateErrorKind};

/// Crate-level error variants.
#[derive(Debug, derive_more::From)]
pub enum VermeerErrorKind {
    /// HTTP error
    Http(HttpError),
    /// JSON serialization/deserialization error
    Json(JsonError),
    /// Configuration error
    Config(ConfigError),
    /// Cache storage error
    Storage(StorageError),
    /// Payload or help templating error
    Template(TemplateError),
    /// Prompt expansion backend error
    Expansion(ExpansionError),
    /// Chat transport error
    Chat(ChatError),
}

impl std::fmt::Display for VermeerErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VermeerErrorKind::Http(e) => write!(f, "{}", e),
            VermeerErrorKind::Json(e) => write!(f, "{}", e),
            VermeerErrorKind::Config(e) => write!(f, "{}", e),
            VermeerErrorKind::Storage(e) => write!(f, "{}", e),
            VermeerErrorKind::Template(e) => write!(f, "{}", e),
            VermeerErrorKind::Expansion(e) => write!(f, "{}", e),
            VermeerErrorKind::Chat(e) => write!(f, "{}", e),
        }
    }
}

/// Vermeer error with kind discrimination.
#[derive(Debug)]
pub struct VermeerError(Box<VermeerErrorKind>);

impl VermeerError {
    /// Create a new error from a kind.
    pub fn new(kind: VermeerErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &VermeerErrorKind {
        &self.0
    }
}

impl std::fmt::Display for VermeerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Vermeer Error: {}", self.0)
    }
}

impl std::error::Error for VermeerError {}

// Generic From implementation for any type that converts to VermeerErrorKind
impl<T> From<T> for VermeerError
where
    T: Into<VermeerErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for Vermeer operations.
pub type VermeerResult<T> = std::result::Result<T, VermeerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn area_errors_convert_into_crate_error() {
        let err: VermeerError =
            ExpansionError::new(ExpansionErrorKind::Status {
                status: 503,
                body: "overloaded".to_string(),
            })
            .into();

        assert!(matches!(err.kind(), VermeerErrorKind::Expansion(_)));
        let rendered = err.to_string();
        assert!(rendered.contains("503"));
        assert!(rendered.contains("overloaded"));
    }

    #[test]
    fn location_points_at_creation_site() {
        let err = ChatError::new(ChatErrorKind::Transport("reset".to_string()));
        assert!(err.file.ends_with("lib.rs"));
        assert!(err.line > 0);
    }

    #[test]
    fn transport_expansion_errors_are_flagged() {
        let transport = ExpansionError::new(ExpansionErrorKind::Transport("refused".into()));
        let status = ExpansionError::new(ExpansionErrorKind::Status {
            status: 500,
            body: String::new(),
        });
        assert!(transport.is_transport());
        assert!(!status.is_transport());
    }
}
