//! Long-polling update loop.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::task::JoinSet;
use tracing::{debug, error, info, instrument, warn};
use vermeer_error::ChatResult;
use vermeer_social::telegram::{PolledMessage, TelegramTransport};

use crate::AppContext;

/// Pause after a failed poll before trying again.
pub const DEFAULT_BACKOFF: Duration = Duration::from_secs(5);

/// Something that yields inbound updates after an offset.
#[async_trait]
pub trait UpdateSource: Send + Sync {
    /// Wait for updates at or after `offset`.
    async fn poll(&self, offset: i64) -> ChatResult<Vec<PolledMessage>>;
}

#[async_trait]
impl UpdateSource for TelegramTransport {
    async fn poll(&self, offset: i64) -> ChatResult<Vec<PolledMessage>> {
        self.get_updates(offset).await
    }
}

/// Dispatches every polled message to the context on its own task.
pub struct Poller {
    source: Arc<dyn UpdateSource>,
    context: Arc<AppContext>,
    offset: i64,
    backoff: Duration,
}

impl Poller {
    /// Poller starting from the oldest unacknowledged update.
    pub fn new(source: Arc<dyn UpdateSource>, context: Arc<AppContext>) -> Self {
        Self {
            source,
            context,
            offset: 0,
            backoff: DEFAULT_BACKOFF,
        }
    }

    /// Use a different pause after failed polls.
    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    /// Offset the next poll will use.
    pub fn offset(&self) -> i64 {
        self.offset
    }

    /// Poll until `shutdown` resolves, then wait for running handlers.
    #[instrument(skip_all)]
    pub async fn run<F>(&mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut tasks = JoinSet::new();
        info!(offset = self.offset, "Polling for updates");

        loop {
            while let Some(finished) = tasks.try_join_next() {
                if let Err(e) = finished {
                    error!(error = %e, "Message handler panicked");
                }
            }

            tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutdown requested, stopping poller");
                    break;
                }
                polled = self.source.poll(self.offset) => match polled {
                    Ok(updates) => self.dispatch(updates, &mut tasks),
                    Err(e) => {
                        warn!(error = %e, backoff = ?self.backoff, "Polling failed");
                        tokio::select! {
                            _ = &mut shutdown => break,
                            _ = tokio::time::sleep(self.backoff) => {}
                        }
                    }
                },
            }
        }

        if !tasks.is_empty() {
            info!(in_flight = tasks.len(), "Waiting for running handlers");
        }
        while let Some(finished) = tasks.join_next().await {
            if let Err(e) = finished {
                error!(error = %e, "Message handler panicked");
            }
        }
    }

    fn dispatch(&mut self, updates: Vec<PolledMessage>, tasks: &mut JoinSet<()>) {
        for update in updates {
            self.offset = self.offset.max(update.next_offset);

            let Some(message) = update.message else {
                debug!(offset = update.next_offset, "Skipping update without text");
                continue;
            };

            let context = self.context.clone();
            tasks.spawn(async move {
                if let Err(e) = context.handle_message(&message).await {
                    error!(error = %e, chat_id = %message.chat_id(), "Failed to handle message");
                }
            });
        }
    }
}
