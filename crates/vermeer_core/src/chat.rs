//! Chat identifiers and inbound messages.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// Platform chat identifier.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::From,
)]
#[serde(transparent)]
pub struct ChatId(pub i64);

/// Platform message identifier, unique within a chat.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::From,
)]
#[serde(transparent)]
pub struct MessageId(pub i64);

/// Text formatting mode understood by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
pub enum ParseMode {
    /// Telegram MarkdownV2
    #[strum(serialize = "MarkdownV2")]
    #[serde(rename = "MarkdownV2")]
    MarkdownV2,
    /// HTML subset
    #[strum(serialize = "HTML")]
    #[serde(rename = "HTML")]
    Html,
}

/// A text message received from a chat.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct IncomingMessage {
    /// Chat the message arrived in
    chat_id: ChatId,
    /// Identifier of the message itself
    message_id: MessageId,
    /// Message text
    text: String,
    /// Sender username, when the platform provides one
    username: Option<String>,
}

impl IncomingMessage {
    /// Creates an inbound message.
    pub fn new(
        chat_id: ChatId,
        message_id: MessageId,
        text: impl Into<String>,
        username: Option<String>,
    ) -> Self {
        Self {
            chat_id,
            message_id,
            text: text.into(),
            username,
        }
    }
}
