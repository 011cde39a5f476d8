//! Telegram Bot API client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, error, instrument};
use vermeer_core::{ChatId, IncomingMessage, MediaPhoto, MessageId, ParseMode};
use vermeer_error::{ChatError, ChatErrorKind, ChatResult};
use vermeer_interface::{ChatTransport, SendOptions};

use super::dto::{
    ApiResponse, BotCommand, DeleteMessageRequest, EditMessageTextRequest, GetUpdatesRequest,
    InputMediaPhoto, LinkPreviewOptions, ReplyParameters, SendMessageRequest,
    SetMyCommandsRequest, TelegramMessage, Update,
};
use super::TelegramConfig;

/// [`ChatTransport`] speaking the Telegram Bot API over HTTPS.
#[derive(Clone)]
pub struct TelegramTransport {
    client: Client,
    base_url: String,
    poll_timeout: Duration,
    request_timeout: Duration,
}

impl std::fmt::Debug for TelegramTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramTransport")
            .field("poll_timeout", &self.poll_timeout)
            .field("request_timeout", &self.request_timeout)
            .finish_non_exhaustive()
    }
}

/// Next update, with the offset to poll from afterwards.
#[derive(Debug, Clone)]
pub struct PolledMessage {
    /// Offset acknowledging this update
    pub next_offset: i64,
    /// Text message carried by the update, if any
    pub message: Option<IncomingMessage>,
}

impl TelegramTransport {
    /// Build a client for the configured bot.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: &TelegramConfig) -> ChatResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| ChatError::new(ChatErrorKind::Transport(e.to_string())))?;

        Ok(Self {
            client,
            base_url: format!(
                "{}/bot{}",
                config.api_base().trim_end_matches('/'),
                config.token()
            ),
            poll_timeout: Duration::from_secs(*config.poll_timeout_secs()),
            request_timeout: Duration::from_secs(*config.request_timeout_secs()),
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/{}", self.base_url, method)
    }

    async fn call<P, R>(&self, method: &str, params: &P, timeout: Duration) -> ChatResult<R>
    where
        P: Serialize + ?Sized + Sync,
        R: DeserializeOwned + Send,
    {
        let response = self
            .client
            .post(self.method_url(method))
            .timeout(timeout)
            .json(params)
            .send()
            .await
            .map_err(|e| {
                error!(method, error = %e, "Telegram request failed");
                ChatError::new(ChatErrorKind::Transport(e.to_string()))
            })?;
        Self::decode(method, response).await
    }

    async fn decode<R: DeserializeOwned + Send>(
        method: &str,
        response: reqwest::Response,
    ) -> ChatResult<R> {
        let status = response.status();
        let envelope: ApiResponse<R> = response.json().await.map_err(|e| {
            error!(method, status = status.as_u16(), error = %e, "Undecodable Telegram reply");
            ChatError::new(ChatErrorKind::InvalidResponse(e.to_string()))
        })?;

        match (envelope.ok, envelope.result) {
            (true, Some(result)) => Ok(result),
            (true, None) => Err(ChatError::new(ChatErrorKind::InvalidResponse(format!(
                "{} returned ok without a result",
                method
            )))),
            (false, _) => {
                let description = envelope
                    .description
                    .unwrap_or_else(|| format!("status {}", status.as_u16()));
                debug!(method, description = %description, "Telegram refused call");
                Err(ChatError::new(ChatErrorKind::Api {
                    method: method.to_string(),
                    description,
                }))
            }
        }
    }

    /// Long-poll for updates after `offset`.
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails or the reply cannot be decoded.
    #[instrument(skip(self))]
    pub async fn get_updates(&self, offset: i64) -> ChatResult<Vec<PolledMessage>> {
        let request = GetUpdatesRequest {
            offset,
            timeout: self.poll_timeout.as_secs(),
            allowed_updates: &["message"],
        };
        let updates: Vec<Update> = self
            .call("getUpdates", &request, self.poll_timeout + self.request_timeout)
            .await?;

        Ok(updates
            .into_iter()
            .map(|update| PolledMessage {
                next_offset: update.update_id + 1,
                message: update.message.and_then(TelegramMessage::into_incoming),
            })
            .collect())
    }

    /// Publish the command menu.
    ///
    /// # Errors
    ///
    /// Returns an error if Telegram rejects the list.
    #[instrument(skip_all, fields(count = commands.len()))]
    pub async fn set_my_commands(&self, commands: &[BotCommand]) -> ChatResult<()> {
        let _: bool = self
            .call(
                "setMyCommands",
                &SetMyCommandsRequest { commands },
                self.request_timeout,
            )
            .await?;
        Ok(())
    }
}

#[async_trait]
impl ChatTransport for TelegramTransport {
    async fn send_message(
        &self,
        chat: ChatId,
        text: &str,
        options: SendOptions,
    ) -> ChatResult<MessageId> {
        let request = SendMessageRequest {
            chat_id: chat.0,
            text,
            parse_mode: options.parse_mode,
            reply_parameters: options.reply_to.map(|id| ReplyParameters {
                message_id: id.0,
                allow_sending_without_reply: true,
            }),
            link_preview_options: options
                .disable_link_preview
                .then_some(LinkPreviewOptions { is_disabled: true }),
        };
        let message: TelegramMessage = self
            .call("sendMessage", &request, self.request_timeout)
            .await?;
        Ok(MessageId(message.message_id))
    }

    async fn edit_message_text(
        &self,
        chat: ChatId,
        message: MessageId,
        text: &str,
        parse_mode: Option<ParseMode>,
    ) -> ChatResult<()> {
        let request = EditMessageTextRequest {
            chat_id: chat.0,
            message_id: message.0,
            text,
            parse_mode,
        };
        // Result is the edited Message, or `true` for inline messages
        let _: serde_json::Value = self
            .call("editMessageText", &request, self.request_timeout)
            .await?;
        Ok(())
    }

    async fn delete_message(&self, chat: ChatId, message: MessageId) -> ChatResult<()> {
        let request = DeleteMessageRequest {
            chat_id: chat.0,
            message_id: message.0,
        };
        let _: bool = self
            .call("deleteMessage", &request, self.request_timeout)
            .await?;
        Ok(())
    }

    async fn send_media_group(
        &self,
        chat: ChatId,
        media: &[MediaPhoto],
    ) -> ChatResult<Vec<MessageId>> {
        if media.is_empty() {
            return Err(ChatError::new(ChatErrorKind::InvalidMedia(
                "media group is empty".to_string(),
            )));
        }

        let descriptors: Vec<InputMediaPhoto<'_>> = media
            .iter()
            .enumerate()
            .map(|(i, photo)| InputMediaPhoto {
                kind: "photo",
                media: format!("attach://photo{}", i),
                caption: photo.caption(),
            })
            .collect();
        let descriptors = serde_json::to_string(&descriptors)
            .map_err(|e| ChatError::new(ChatErrorKind::InvalidMedia(e.to_string())))?;

        let mut form = Form::new()
            .text("chat_id", chat.0.to_string())
            .text("media", descriptors);
        for (i, photo) in media.iter().enumerate() {
            let part = Part::bytes(photo.data().clone())
                .file_name(photo.file_name().clone())
                .mime_str("image/png")
                .map_err(|e| ChatError::new(ChatErrorKind::InvalidMedia(e.to_string())))?;
            form = form.part(format!("photo{}", i), part);
        }

        let method = "sendMediaGroup";
        let response = self
            .client
            .post(self.method_url(method))
            .timeout(self.request_timeout)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                error!(method, error = %e, "Telegram request failed");
                ChatError::new(ChatErrorKind::Transport(e.to_string()))
            })?;
        let messages: Vec<TelegramMessage> = Self::decode(method, response).await?;

        Ok(messages
            .into_iter()
            .map(|message| MessageId(message.message_id))
            .collect())
    }
}
