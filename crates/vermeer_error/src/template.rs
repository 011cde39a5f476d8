//! Template error types.

/// Specific error conditions for payload and help templating.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TemplateErrorKind {
    /// Template source could not be read or compiled
    Load {
        /// Template name
        name: String,
        /// Loader or syntax message
        message: String,
    },
    /// Rendering failed
    Render {
        /// Template name
        name: String,
        /// Renderer message
        message: String,
    },
    /// Rendered text is not a JSON object
    InvalidPayload(String),
}

impl std::fmt::Display for TemplateErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TemplateErrorKind::Load { name, message } => {
                write!(f, "Failed to load template '{}': {}", name, message)
            }
            TemplateErrorKind::Render { name, message } => {
                write!(f, "Failed to render template '{}': {}", name, message)
            }
            TemplateErrorKind::InvalidPayload(msg) => {
                write!(f, "Rendered payload is not a JSON object: {}", msg)
            }
        }
    }
}

/// Error type for templating operations.
///
/// # Examples
///
/// ```
/// use vermeer_error::{TemplateError, TemplateErrorKind};
///
/// let err = TemplateError::new(TemplateErrorKind::InvalidPayload("[]".to_string()));
/// assert!(format!("{}", err).contains("not a JSON object"));
/// ```
#[derive(Debug, Clone)]
pub struct TemplateError {
    /// The specific error condition
    pub kind: TemplateErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl TemplateError {
    /// Create a new TemplateError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: TemplateErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}

impl std::fmt::Display for TemplateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Template Error: {} at line {} in {}",
            self.kind, self.line, self.file
        )
    }
}

impl std::error::Error for TemplateError {}
