//! Chat transport error types.
//!
//! Covers failures of the messaging platform: API refusals (message already
//! deleted, message not modified), network errors, and undecodable replies.

use std::fmt;

/// Chat error variants.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ChatErrorKind {
    /// Platform API refused the call.
    Api {
        /// API method name
        method: String,
        /// Platform-supplied description
        description: String,
    },

    /// Network-level failure talking to the platform.
    Transport(String),

    /// Platform reply could not be decoded.
    InvalidResponse(String),

    /// Media payload could not be prepared (bad base64, empty group).
    InvalidMedia(String),
}

impl fmt::Display for ChatErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Api {
                method,
                description,
            } => write!(f, "{method} refused: {description}"),
            Self::Transport(msg) => write!(f, "Transport failure: {msg}"),
            Self::InvalidResponse(msg) => write!(f, "Invalid response: {msg}"),
            Self::InvalidMedia(msg) => write!(f, "Invalid media: {msg}"),
        }
    }
}

/// Chat error with source location tracking.
#[derive(Debug, Clone)]
pub struct ChatError {
    /// The kind of error
    pub kind: ChatErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl ChatError {
    /// Create a new ChatError with automatic location tracking.
    ///
    /// # Example
    /// ```
    /// use vermeer_error::{ChatError, ChatErrorKind};
    ///
    /// let err = ChatError::new(ChatErrorKind::Transport("timeout".to_string()));
    /// assert!(err.to_string().contains("timeout"));
    /// ```
    #[track_caller]
    pub fn new(kind: ChatErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}

impl fmt::Display for ChatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Chat Error: {} at line {} in {}",
            self.kind, self.line, self.file
        )
    }
}

impl std::error::Error for ChatError {}

/// Result type for chat operations.
pub type ChatResult<T> = Result<T, ChatError>;
