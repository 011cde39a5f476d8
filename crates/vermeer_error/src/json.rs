//! JSON shape errors.
//!
//! Raised when a rendered payload or a backend reply is valid JSON of the
//! wrong shape, such as an array where an object is required.

/// Payload or reply JSON that cannot be used, with source location.
///
/// ```
/// use vermeer_error::JsonError;
///
/// let err = JsonError::new("payload must be a JSON object, got []");
/// assert!(err.to_string().starts_with("JSON Error: payload must be a JSON object"));
/// ```
#[derive(Debug, Clone)]
pub struct JsonError {
    /// What was wrong with the document
    pub message: String,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl JsonError {
    /// Record a shape problem at the caller's location.
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: location.line(),
            file: location.file(),
        }
    }
}

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "JSON Error: {} at line {} in {}",
            self.message, self.line, self.file
        )
    }
}

impl std::error::Error for JsonError {}
