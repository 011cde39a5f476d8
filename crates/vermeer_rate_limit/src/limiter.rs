//! Process-wide limiter for chat operations.
//!
//! Governor's GCRA limiter enforces the spacing; a fair `tokio` mutex in front
//! of it makes waiters leave in the order they arrived. Governor alone wakes
//! waiters in no particular order.

use std::sync::Arc;
use std::time::Duration;

use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter as GovernorRateLimiter};
use tokio::sync::Mutex;
use tracing::{debug, instrument};

use crate::{RateLimitConfig, RateLimitError, RateLimitErrorKind};

type DirectRateLimiter = GovernorRateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Shared limiter allowing one operation per configured period.
///
/// Cloning is cheap; clones share the same budget.
///
/// # Example
///
/// ```no_run
/// use vermeer_rate_limit::{ChatRateLimiter, RateLimitConfig};
///
/// # async fn run() -> Result<(), vermeer_rate_limit::RateLimitError> {
/// let limiter = ChatRateLimiter::new(RateLimitConfig::default())?;
/// limiter.acquire().await;
/// // send the message
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ChatRateLimiter {
    limiter: Arc<DirectRateLimiter>,
    queue: Arc<Mutex<()>>,
    period: Duration,
}

impl ChatRateLimiter {
    /// Build a limiter from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the period is zero.
    pub fn new(config: RateLimitConfig) -> Result<Self, RateLimitError> {
        let period = config.period();
        let quota = Quota::with_period(period).ok_or_else(|| {
            RateLimitError::new(RateLimitErrorKind::Config(
                "period_ms must be greater than zero".to_string(),
            ))
        })?;

        Ok(Self {
            limiter: Arc::new(GovernorRateLimiter::direct(quota)),
            queue: Arc::new(Mutex::new(())),
            period,
        })
    }

    /// Minimum spacing between operations.
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Wait for the next slot. Callers are released in arrival order.
    #[instrument(skip(self), level = "trace")]
    pub async fn acquire(&self) {
        let _turn = self.queue.lock().await;
        self.limiter.until_ready().await;
        debug!("Chat operation slot acquired");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn test_zero_period_rejected() {
        let result = ChatRateLimiter::new(RateLimitConfig::default().with_period_ms(0));
        let err = result.unwrap_err();
        assert!(matches!(err.kind(), RateLimitErrorKind::Config(_)));
    }

    #[tokio::test]
    async fn test_three_operations_take_two_periods() {
        let limiter = ChatRateLimiter::new(RateLimitConfig::default()).unwrap();
        let start = Instant::now();
        for _ in 0..3 {
            limiter.acquire().await;
        }
        // GCRA clock and Instant may disagree by a few ms
        assert!(start.elapsed() >= Duration::from_millis(990));
    }

    #[tokio::test]
    async fn test_clones_share_budget() {
        let limiter = ChatRateLimiter::new(RateLimitConfig::default().with_period_ms(200)).unwrap();
        let other = limiter.clone();
        let start = Instant::now();
        limiter.acquire().await;
        other.acquire().await;
        assert!(start.elapsed() >= Duration::from_millis(190));
    }

    #[tokio::test]
    async fn test_waiters_released_in_arrival_order() {
        let limiter = ChatRateLimiter::new(RateLimitConfig::default().with_period_ms(50)).unwrap();
        let order = Arc::new(std::sync::Mutex::new(Vec::new()));

        let mut tasks = Vec::new();
        for i in 0..5 {
            let limiter = limiter.clone();
            let order = Arc::clone(&order);
            tasks.push(tokio::spawn(async move {
                limiter.acquire().await;
                order.lock().unwrap().push(i);
            }));
            // stagger arrivals
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        for task in tasks {
            task.await.unwrap();
        }

        assert_eq!(*order.lock().unwrap(), vec![0, 1, 2, 3, 4]);
    }
}
