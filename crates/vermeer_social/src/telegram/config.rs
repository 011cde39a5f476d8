//! Telegram connection settings.

use serde::{Deserialize, Serialize};

/// Settings for the Telegram Bot API.
#[derive(
    Clone, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters, derive_setters::Setters,
)]
#[setters(prefix = "with_")]
#[serde(default)]
pub struct TelegramConfig {
    /// Bot token from BotFather
    token: String,
    /// API root, without the `/bot<token>` part
    api_base: String,
    /// Long-poll wait passed to `getUpdates`, in seconds
    poll_timeout_secs: u64,
    /// Timeout for ordinary API calls, in seconds
    request_timeout_secs: u64,
    /// Log chat operations instead of performing them
    disabled: bool,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            api_base: "https://api.telegram.org".to_string(),
            poll_timeout_secs: 30,
            request_timeout_secs: 30,
            disabled: false,
        }
    }
}

impl std::fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("token", &"<redacted>")
            .field("api_base", &self.api_base)
            .field("poll_timeout_secs", &self.poll_timeout_secs)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("disabled", &self.disabled)
            .finish()
    }
}
