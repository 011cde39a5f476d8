//! Rate-limited reply channel over a real transport.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error, info, instrument};
use vermeer_core::{ChatId, MediaPhoto, MessageId};
use vermeer_error::ChatResult;
use vermeer_interface::{ChatTransport, MessageHandle, ReplyChannel, SendOptions};
use vermeer_rate_limit::ChatRateLimiter;

use crate::{truncate_caption, truncate_message};

/// Largest number of photos in one media group.
pub const MAX_MEDIA_GROUP: usize = 10;

struct LiveInner {
    transport: Arc<dyn ChatTransport>,
    limiter: ChatRateLimiter,
}

impl LiveInner {
    async fn edit(&self, chat: ChatId, message: MessageId, text: &str) -> ChatResult<()> {
        self.limiter.acquire().await;
        let text = truncate_message(text);
        info!(chat_id = %chat, message_id = %message, text = %text, "Editing message");
        self.transport
            .edit_message_text(chat, message, &text, None)
            .await
    }

    async fn delete(&self, chat: ChatId, message: MessageId) -> ChatResult<()> {
        self.limiter.acquire().await;
        info!(chat_id = %chat, message_id = %message, "Deleting message");
        self.transport.delete_message(chat, message).await
    }
}

/// [`ReplyChannel`] that throttles every operation through one limiter.
///
/// Clones share the transport and the limiter.
#[derive(Clone)]
pub struct LiveReplyChannel {
    inner: Arc<LiveInner>,
}

impl std::fmt::Debug for LiveReplyChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LiveReplyChannel")
            .field("period", &self.inner.limiter.period())
            .finish_non_exhaustive()
    }
}

impl LiveReplyChannel {
    /// Wrap `transport`, spacing operations with `limiter`.
    pub fn new(transport: Arc<dyn ChatTransport>, limiter: ChatRateLimiter) -> Self {
        Self {
            inner: Arc::new(LiveInner { transport, limiter }),
        }
    }
}

#[async_trait]
impl ReplyChannel for LiveReplyChannel {
    #[instrument(skip(self, text, options), fields(chat_id = %chat))]
    async fn send(
        &self,
        chat: ChatId,
        text: &str,
        options: SendOptions,
    ) -> ChatResult<Box<dyn MessageHandle>> {
        self.inner.limiter.acquire().await;
        let text = truncate_message(text);
        let id = self
            .inner
            .transport
            .send_message(chat, &text, options)
            .await?;
        info!(message_id = %id, text = %text, "Sent message");

        Ok(Box::new(LiveMessage {
            chat,
            id,
            inner: Arc::clone(&self.inner),
        }))
    }

    #[instrument(skip(self, media), fields(chat_id = %chat, photos = media.len()))]
    async fn send_gallery(
        &self,
        chat: ChatId,
        media: Vec<MediaPhoto>,
    ) -> ChatResult<Vec<MessageId>> {
        let media: Vec<MediaPhoto> = media
            .into_iter()
            .map(|photo| {
                let caption = truncate_caption(photo.caption()).into_owned();
                let (data, file_name) = (photo.data().clone(), photo.file_name().clone());
                MediaPhoto::new(data, caption, file_name)
            })
            .collect();

        let mut ids = Vec::with_capacity(media.len());
        for group in media.chunks(MAX_MEDIA_GROUP) {
            self.inner.limiter.acquire().await;
            match self.inner.transport.send_media_group(chat, group).await {
                Ok(sent) => {
                    debug!(parts = sent.len(), "Sent media group");
                    ids.extend(sent);
                }
                // Earlier groups are already in the chat; hand their ids back
                // so the caller can still delete them.
                Err(e) if !ids.is_empty() => {
                    error!(error = %e, sent = ids.len(), "Gallery only partially sent");
                    return Ok(ids);
                }
                Err(e) => return Err(e),
            }
        }
        Ok(ids)
    }

    async fn delete_message(&self, chat: ChatId, message: MessageId) -> ChatResult<()> {
        self.inner.delete(chat, message).await
    }

    fn is_disabled(&self) -> bool {
        false
    }
}

/// Handle to a message sent through a [`LiveReplyChannel`].
pub struct LiveMessage {
    chat: ChatId,
    id: MessageId,
    inner: Arc<LiveInner>,
}

impl std::fmt::Debug for LiveMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LiveMessage")
            .field("chat", &self.chat)
            .field("id", &self.id)
            .finish()
    }
}

#[async_trait]
impl MessageHandle for LiveMessage {
    fn chat_id(&self) -> ChatId {
        self.chat
    }

    fn message_id(&self) -> MessageId {
        self.id
    }

    async fn edit_text(&self, text: &str) -> ChatResult<()> {
        self.inner.edit(self.chat, self.id, text).await
    }

    async fn delete(&self) -> ChatResult<()> {
        self.inner.delete(self.chat, self.id).await
    }
}
