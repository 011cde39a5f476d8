//! Reply channel that only logs.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use tracing::info;
use vermeer_core::{ChatId, MediaPhoto, MessageId};
use vermeer_error::ChatResult;
use vermeer_interface::{MessageHandle, ReplyChannel, SendOptions};

/// [`ReplyChannel`] for dry runs: nothing reaches the platform.
///
/// Every operation is logged at `info` with the prefix `chat disabled` and
/// succeeds. Sent messages get locally numbered ids so callers can still
/// edit and delete them.
#[derive(Debug, Clone, Default)]
pub struct DisabledReplyChannel {
    next_id: Arc<AtomicI64>,
}

impl DisabledReplyChannel {
    /// Create a channel.
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate(&self) -> MessageId {
        MessageId(self.next_id.fetch_add(1, Ordering::Relaxed) + 1)
    }
}

#[async_trait]
impl ReplyChannel for DisabledReplyChannel {
    async fn send(
        &self,
        chat: ChatId,
        text: &str,
        options: SendOptions,
    ) -> ChatResult<Box<dyn MessageHandle>> {
        let id = self.allocate();
        info!(chat_id = %chat, message_id = %id, ?options, text, "chat disabled: send");
        Ok(Box::new(DisabledMessage { chat, id }))
    }

    async fn send_gallery(
        &self,
        chat: ChatId,
        media: Vec<MediaPhoto>,
    ) -> ChatResult<Vec<MessageId>> {
        let captions: Vec<&str> = media.iter().map(|p| p.caption().as_str()).collect();
        info!(chat_id = %chat, photos = media.len(), ?captions, "chat disabled: send_gallery");
        Ok(media.iter().map(|_| self.allocate()).collect())
    }

    async fn delete_message(&self, chat: ChatId, message: MessageId) -> ChatResult<()> {
        info!(chat_id = %chat, message_id = %message, "chat disabled: delete_message");
        Ok(())
    }

    fn is_disabled(&self) -> bool {
        true
    }
}

/// Stub handle returned by [`DisabledReplyChannel`].
#[derive(Debug, Clone, Copy)]
pub struct DisabledMessage {
    chat: ChatId,
    id: MessageId,
}

#[async_trait]
impl MessageHandle for DisabledMessage {
    fn chat_id(&self) -> ChatId {
        self.chat
    }

    fn message_id(&self) -> MessageId {
        self.id
    }

    async fn edit_text(&self, text: &str) -> ChatResult<()> {
        info!(chat_id = %self.chat, message_id = %self.id, text, "chat disabled: edit_text");
        Ok(())
    }

    async fn delete(&self) -> ChatResult<()> {
        info!(chat_id = %self.chat, message_id = %self.id, "chat disabled: delete");
        Ok(())
    }
}
