//! Shared application state and per-message command handling.

use std::sync::Arc;

use tracing::{debug, error, info, instrument, warn};
use vermeer_core::{GenerationParams, IncomingMessage, ParseMode};
use vermeer_error::{ConfigError, ConfigErrorKind, VermeerResult};
use vermeer_interface::{
    ChatTransport, ImageGenerator, PayloadTemplater, PromptExpander, ReplyChannel, SendOptions,
};
use vermeer_models::{GenerationClient, HttpPromptExpander};
use vermeer_rate_limit::ChatRateLimiter;
use vermeer_social::{DisabledReplyChannel, LiveReplyChannel};
use vermeer_template::MiniJinjaTemplater;

use crate::commands::{Command, RECEIVED, WELCOME, apology};
use crate::{BotConfig, GalleryRenderer, PayloadPlanner, ReportMode};

/// Pick the reply channel for `config`: a logging stub in dry-run mode,
/// otherwise a throttled channel over `transport`.
///
/// # Errors
///
/// Returns an error if the rate limit is unusable.
pub fn build_reply_channel(
    config: &BotConfig,
    transport: Arc<dyn ChatTransport>,
) -> VermeerResult<Arc<dyn ReplyChannel>> {
    if *config.telegram().disabled() {
        info!("Chat operations disabled, only logging");
        return Ok(Arc::new(DisabledReplyChannel::new()));
    }

    let limiter = ChatRateLimiter::new(*config.rate_limit()).map_err(|e| {
        ConfigError::new(ConfigErrorKind::Invalid {
            key: "rate_limit.period_ms".to_string(),
            reason: e.to_string(),
        })
    })?;
    Ok(Arc::new(LiveReplyChannel::new(transport, limiter)))
}

/// Everything a command handler needs, built once at startup.
pub struct AppContext {
    planner: PayloadPlanner,
    renderer: GalleryRenderer,
    templater: Arc<dyn PayloadTemplater>,
    channel: Arc<dyn ReplyChannel>,
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("planner", &self.planner)
            .field("renderer", &self.renderer)
            .finish_non_exhaustive()
    }
}

impl AppContext {
    /// Assemble a context from its collaborators.
    pub fn new(
        templater: Arc<dyn PayloadTemplater>,
        expander: Option<Arc<dyn PromptExpander>>,
        generator: Arc<dyn ImageGenerator>,
        channel: Arc<dyn ReplyChannel>,
    ) -> Self {
        Self {
            planner: PayloadPlanner::new(templater.clone(), expander),
            renderer: GalleryRenderer::new(generator, channel.clone()),
            templater,
            channel,
        }
    }

    /// Cap the images a single command may request.
    pub fn with_max_batch_count(mut self, max: usize) -> Self {
        self.planner = self.planner.with_max_batch_count(max);
        self
    }

    /// Build the HTTP backends, cache and templates described by `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if a template override cannot be loaded or an HTTP
    /// client cannot be built.
    pub fn from_config(config: &BotConfig, channel: Arc<dyn ReplyChannel>) -> VermeerResult<Self> {
        let templater: Arc<dyn PayloadTemplater> =
            Arc::new(MiniJinjaTemplater::from_config(config.templates())?);

        let expander = HttpPromptExpander::from_config(config.expander())?
            .map(|expander| Arc::new(expander) as Arc<dyn PromptExpander>);
        if expander.is_none() {
            warn!("No prompt expander configured, optimized prompts fall back to the base prompt");
        }

        let cache = config.cache().open();
        let generator = Arc::new(GenerationClient::new(config.generation(), cache)?);

        info!(
            generation = %config.generation().endpoint(),
            expander = ?config.expander().endpoint(),
            disabled = channel.is_disabled(),
            "Application context ready"
        );
        Ok(Self::new(templater, expander, generator, channel)
            .with_max_batch_count(*config.generation().max_batch_count()))
    }

    /// The reply channel every handler writes to.
    pub fn channel(&self) -> &Arc<dyn ReplyChannel> {
        &self.channel
    }

    /// React to one inbound message.
    ///
    /// # Errors
    ///
    /// Returns an error if a reply cannot be sent or the help and default
    /// payload templates fail to render.
    #[instrument(skip_all, fields(chat_id = %message.chat_id(), message_id = %message.message_id()))]
    pub async fn handle_message(&self, message: &IncomingMessage) -> VermeerResult<()> {
        let Some(command) = Command::parse(message.text()) else {
            debug!(user = ?message.username(), "Ignoring non-command message");
            return Ok(());
        };
        debug!(command = ?command, "Handling command");

        match command {
            Command::Start => {
                self.channel.reply(message, WELCOME).await?;
            }
            Command::Help => {
                let help = self.templater.render_help()?;
                let options = SendOptions::default()
                    .with_reply_to(*message.message_id())
                    .with_parse_mode(ParseMode::MarkdownV2)
                    .with_disable_link_preview(true);
                self.channel.send(*message.chat_id(), &help, options).await?;
            }
            Command::ApiDef => {
                let payload = self.templater.render_payload(&GenerationParams::new())?;
                self.channel.reply(message, &payload.to_pretty_json()).await?;
            }
            Command::Generate { text, mode } => {
                self.run_session(message, &text, mode).await?;
            }
        }
        Ok(())
    }

    /// Plan and render one generation request.
    ///
    /// Planning failures and chat failures inside the renderer end the
    /// session with an apology instead of an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the status message cannot be sent.
    #[instrument(skip(self, message, text), fields(chat_id = %message.chat_id()))]
    pub async fn run_session(
        &self,
        message: &IncomingMessage,
        text: &str,
        mode: ReportMode,
    ) -> VermeerResult<()> {
        let status = self.channel.reply(message, RECEIVED).await?;

        let payloads = match self.planner.plan_message(text).await {
            Ok(payloads) => payloads,
            Err(e) => {
                warn!(error = %e, "Planning failed");
                self.apologize(message, &e).await;
                return Ok(());
            }
        };

        if let Err(e) = status.delete().await {
            warn!(error = %e, "Failed to remove status message");
        }

        if let Err(e) = self.renderer.run(message, payloads, mode).await {
            warn!(error = %e, "Generation session aborted");
            self.apologize(message, &e).await;
        }
        Ok(())
    }

    async fn apologize(&self, message: &IncomingMessage, cause: &impl std::fmt::Display) {
        if let Err(e) = self.channel.reply(message, &apology(cause)).await {
            error!(error = %e, "Failed to send apology");
        }
    }
}
