//! Telegram Bot API wire types.
//!
//! Only the fields the bot reads are modelled; everything else in the
//! platform's objects is ignored on decode.

use serde::{Deserialize, Serialize};
use vermeer_core::{ChatId, IncomingMessage, MessageId, ParseMode};

/// Envelope around every Bot API reply.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse<T> {
    /// Whether the call succeeded
    pub ok: bool,
    /// Method-specific payload on success
    pub result: Option<T>,
    /// Human-readable failure reason
    #[serde(default)]
    pub description: Option<String>,
    /// Numeric failure code
    #[serde(default)]
    pub error_code: Option<i64>,
}

/// One entry from `getUpdates`.
#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    /// Monotonic update id
    pub update_id: i64,
    /// New incoming message, if this update carries one
    #[serde(default)]
    pub message: Option<TelegramMessage>,
}

/// A Telegram message.
#[derive(Debug, Clone, Deserialize)]
pub struct TelegramMessage {
    /// Id within the chat
    pub message_id: i64,
    /// Chat the message belongs to
    pub chat: TelegramChat,
    /// Sender, absent for channel posts
    #[serde(default)]
    pub from: Option<TelegramUser>,
    /// Text body
    #[serde(default)]
    pub text: Option<String>,
}

impl TelegramMessage {
    /// Convert to the platform-neutral form. Messages without text yield `None`.
    pub fn into_incoming(self) -> Option<IncomingMessage> {
        let text = self.text?;
        Some(IncomingMessage::new(
            ChatId(self.chat.id),
            MessageId(self.message_id),
            text,
            self.from.and_then(|user| user.username),
        ))
    }
}

/// A Telegram chat.
#[derive(Debug, Clone, Deserialize)]
pub struct TelegramChat {
    /// Chat id
    pub id: i64,
}

/// A Telegram user.
#[derive(Debug, Clone, Deserialize)]
pub struct TelegramUser {
    /// User id
    pub id: i64,
    /// Public username
    #[serde(default)]
    pub username: Option<String>,
}

/// Entry in the command menu set with `setMyCommands`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BotCommand {
    /// Command name without the leading slash
    pub command: String,
    /// Menu description
    pub description: String,
}

impl BotCommand {
    /// Creates a command entry.
    pub fn new(command: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            description: description.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ReplyParameters {
    pub message_id: i64,
    pub allow_sending_without_reply: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct LinkPreviewOptions {
    pub is_disabled: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct SendMessageRequest<'a> {
    pub chat_id: i64,
    pub text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_mode: Option<ParseMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_parameters: Option<ReplyParameters>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link_preview_options: Option<LinkPreviewOptions>,
}

#[derive(Debug, Serialize)]
pub(crate) struct EditMessageTextRequest<'a> {
    pub chat_id: i64,
    pub message_id: i64,
    pub text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_mode: Option<ParseMode>,
}

#[derive(Debug, Serialize)]
pub(crate) struct DeleteMessageRequest {
    pub chat_id: i64,
    pub message_id: i64,
}

#[derive(Debug, Serialize)]
pub(crate) struct GetUpdatesRequest {
    pub offset: i64,
    pub timeout: u64,
    pub allowed_updates: &'static [&'static str],
}

#[derive(Debug, Serialize)]
pub(crate) struct SetMyCommandsRequest<'a> {
    pub commands: &'a [BotCommand],
}

#[derive(Debug, Serialize)]
pub(crate) struct InputMediaPhoto<'a> {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub media: String,
    pub caption: &'a str,
}
