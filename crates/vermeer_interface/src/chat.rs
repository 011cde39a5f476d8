//! Chat-surface traits.
//!
//! [`ChatTransport`] is the raw platform API. [`ReplyChannel`] is what
//! session code talks to: it adds throttling, truncation and the disabled
//! mode on top of a transport. Messages created through a channel come back
//! as [`MessageHandle`]s, which know how to edit and delete themselves.

use async_trait::async_trait;
use vermeer_core::{ChatId, IncomingMessage, MediaPhoto, MessageId, ParseMode};
use vermeer_error::ChatResult;

/// Options for sending a text message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, derive_setters::Setters)]
#[setters(prefix = "with_")]
pub struct SendOptions {
    /// Message this one replies to
    #[setters(strip_option)]
    pub reply_to: Option<MessageId>,
    /// Formatting mode for the text
    #[setters(strip_option)]
    pub parse_mode: Option<ParseMode>,
    /// Suppress link previews
    pub disable_link_preview: bool,
}

/// Raw messaging-platform operations.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Send a text message and return its id.
    async fn send_message(
        &self,
        chat: ChatId,
        text: &str,
        options: SendOptions,
    ) -> ChatResult<MessageId>;

    /// Replace the text of an existing message.
    async fn edit_message_text(
        &self,
        chat: ChatId,
        message: MessageId,
        text: &str,
        parse_mode: Option<ParseMode>,
    ) -> ChatResult<()>;

    /// Remove a message.
    async fn delete_message(&self, chat: ChatId, message: MessageId) -> ChatResult<()>;

    /// Send photos as one grouped message and return the ids of its parts.
    async fn send_media_group(
        &self,
        chat: ChatId,
        media: &[MediaPhoto],
    ) -> ChatResult<Vec<MessageId>>;
}

/// A message previously sent through a [`ReplyChannel`].
#[async_trait]
pub trait MessageHandle: Send + Sync + std::fmt::Debug {
    /// Chat the message lives in.
    fn chat_id(&self) -> ChatId;

    /// Platform id of the message.
    fn message_id(&self) -> MessageId;

    /// Replace the message text.
    async fn edit_text(&self, text: &str) -> ChatResult<()>;

    /// Remove the message.
    async fn delete(&self) -> ChatResult<()>;
}

/// Throttled chat operations used by generation sessions.
#[async_trait]
pub trait ReplyChannel: Send + Sync {
    /// Send a text message.
    async fn send(
        &self,
        chat: ChatId,
        text: &str,
        options: SendOptions,
    ) -> ChatResult<Box<dyn MessageHandle>>;

    /// Send a group of photos, returning the ids of every part.
    ///
    /// A gallery may go out as several platform messages. If a later one
    /// fails, the ids of the parts already delivered are returned instead of
    /// an error, so they can still be cleaned up.
    ///
    /// # Errors
    ///
    /// Returns an error only when nothing was delivered.
    async fn send_gallery(&self, chat: ChatId, media: Vec<MediaPhoto>)
    -> ChatResult<Vec<MessageId>>;

    /// Remove a message known only by id.
    async fn delete_message(&self, chat: ChatId, message: MessageId) -> ChatResult<()>;

    /// True when operations are only logged.
    fn is_disabled(&self) -> bool;

    /// Reply to an inbound message.
    async fn reply(&self, to: &IncomingMessage, text: &str) -> ChatResult<Box<dyn MessageHandle>> {
        self.send(
            *to.chat_id(),
            text,
            SendOptions::default().with_reply_to(*to.message_id()),
        )
        .await
    }
}
