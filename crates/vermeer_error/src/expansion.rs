//! Prompt expansion error types.

/// Error kinds for the prompt-expansion backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum ExpansionErrorKind {
    /// Backend answered with a non-success status.
    #[display("Request failed with status code {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body as text
        body: String,
    },
    /// Backend could not be reached.
    #[display("Transport failure: {_0}")]
    Transport(String),
    /// Backend answered 2xx with a body that is not a list of strings.
    #[display("Invalid response: {_0}")]
    InvalidResponse(String),
}

/// Prompt expansion error with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Expansion Error: {} at line {} in {}", kind, line, file)]
pub struct ExpansionError {
    kind: ExpansionErrorKind,
    line: u32,
    file: &'static str,
}

impl ExpansionError {
    /// Create a new expansion error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: ExpansionErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &ExpansionErrorKind {
        &self.kind
    }

    /// True when the backend was unreachable rather than refusing the request.
    pub fn is_transport(&self) -> bool {
        matches!(self.kind, ExpansionErrorKind::Transport(_))
    }
}

impl<T> From<T> for ExpansionError
where
    T: Into<ExpansionErrorKind>,
{
    #[track_caller]
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}
