//! Rate limiting for Vermeer chat operations.
//!
//! Every message send, edit and delete, across all sessions, passes through
//! one [`ChatRateLimiter`]. Operations are spaced by a fixed period (500 ms by
//! default) and released in the order they were requested.

#![warn(missing_docs)]

mod config;
mod error;
mod limiter;

pub use config::RateLimitConfig;
pub use error::{RateLimitError, RateLimitErrorKind};
pub use limiter::ChatRateLimiter;
