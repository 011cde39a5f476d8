//! Configuration error types.

/// Kinds of configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum ConfigErrorKind {
    /// A required setting is absent from every source
    #[display("Missing required setting: {}", _0)]
    Missing(String),
    /// A setting is present but unusable
    #[display("Invalid setting {}: {}", key, reason)]
    Invalid {
        /// Setting name
        key: String,
        /// Why the value was rejected
        reason: String,
    },
    /// Sources could not be read or merged
    #[display("Failed to load configuration: {}", _0)]
    Load(String),
}

/// Configuration error with source location.
///
/// # Examples
///
/// ```
/// use vermeer_error::{ConfigError, ConfigErrorKind};
///
/// let err = ConfigError::new(ConfigErrorKind::Missing("telegram.token".to_string()));
/// assert!(format!("{}", err).contains("telegram.token"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Configuration Error: {} at line {} in {}", kind, line, file)]
pub struct ConfigError {
    /// The kind of error that occurred
    pub kind: ConfigErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl ConfigError {
    /// Create a new ConfigError at the current location.
    #[track_caller]
    pub fn new(kind: ConfigErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
