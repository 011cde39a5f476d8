//! Rate limiter configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Spacing between chat operations.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    derive_getters::Getters,
    derive_setters::Setters,
)]
#[setters(prefix = "with_")]
#[serde(default)]
pub struct RateLimitConfig {
    /// Minimum milliseconds between two operations
    period_ms: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self { period_ms: 500 }
    }
}

impl RateLimitConfig {
    /// The period as a [`Duration`].
    pub fn period(&self) -> Duration {
        Duration::from_millis(self.period_ms)
    }
}
