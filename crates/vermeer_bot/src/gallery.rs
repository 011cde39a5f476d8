//! Incremental gallery rendering for one generation session.
//!
//! Payloads are processed one after another. After every successful request
//! the previous gallery is removed and a fresh one holding every image so
//! far is sent, so the chat always shows a single up-to-date gallery.

use std::sync::Arc;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use tracing::{debug, error, info, instrument, warn};
use vermeer_core::{GenerationResult, IncomingMessage, MediaPhoto, Payload};
use vermeer_error::ChatResult;
use vermeer_interface::{ImageGenerator, ReplyChannel};

/// Text shown in place of the progress notice when a request fails.
pub const FAILURE_NOTICE: &str = "Failed to generate images.";

/// How much detail progress notices carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum ReportMode {
    /// Position only
    #[default]
    Short,
    /// Position plus the full payload
    Verbose,
}

impl ReportMode {
    /// Progress notice for request `index` of `total`.
    pub fn announce_text(self, index: usize, total: usize, payload: &Payload) -> String {
        match self {
            Self::Short => format!("🔄Generating image {} out of {}", index + 1, total),
            Self::Verbose => format!(
                "🔄 Generating with parameters for payload {} out of {}: {}",
                index + 1,
                total,
                payload.to_pretty_json()
            ),
        }
    }
}

/// Flatten results into gallery photos.
///
/// Captions read `{prompt} batch# {k}` where `k` counts only images that
/// made it into the gallery, starting at 0. Images that do not decode are
/// skipped.
pub fn build_gallery(results: &[GenerationResult]) -> Vec<MediaPhoto> {
    let mut photos = Vec::new();

    for result in results {
        let prompt = result.payload().prompt();
        for image in result.images() {
            match STANDARD.decode(image) {
                Ok(data) => {
                    let k = photos.len();
                    photos.push(MediaPhoto::new(
                        data,
                        format!("{} batch# {}", prompt, k),
                        format!("image_{}.png", k),
                    ));
                }
                Err(e) => warn!(error = %e, "Skipping image that is not valid base64"),
            }
        }
    }

    photos
}

/// Drives the requests of one session and keeps the chat gallery current.
#[derive(Clone)]
pub struct GalleryRenderer {
    generator: Arc<dyn ImageGenerator>,
    channel: Arc<dyn ReplyChannel>,
}

impl std::fmt::Debug for GalleryRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GalleryRenderer")
            .field("disabled", &self.channel.is_disabled())
            .finish_non_exhaustive()
    }
}

impl GalleryRenderer {
    /// Renderer fetching through `generator` and talking to `channel`.
    pub fn new(generator: Arc<dyn ImageGenerator>, channel: Arc<dyn ReplyChannel>) -> Self {
        Self { generator, channel }
    }

    /// Process every payload in order, replying to `origin`.
    ///
    /// Failed requests are reported in chat and do not stop the session.
    ///
    /// # Errors
    ///
    /// Returns an error only when a progress notice cannot be sent.
    #[instrument(skip_all, fields(chat = %origin.chat_id(), payloads = payloads.len(), mode = %mode))]
    pub async fn run(
        &self,
        origin: &IncomingMessage,
        payloads: Vec<Payload>,
        mode: ReportMode,
    ) -> ChatResult<Vec<GenerationResult>> {
        let mut results = GenerationResult::for_plan(payloads);

        for index in 0..results.len() {
            self.process_request(origin, &mut results, index, mode).await?;
        }

        info!(
            images = results.iter().map(|r| r.images().len()).sum::<usize>(),
            "Generation session finished"
        );
        Ok(results)
    }

    async fn process_request(
        &self,
        origin: &IncomingMessage,
        results: &mut [GenerationResult],
        index: usize,
        mode: ReportMode,
    ) -> ChatResult<()> {
        let total = results.len();
        let notice = mode.announce_text(index, total, results[index].payload());
        let progress = self.channel.reply(origin, &notice).await?;

        match self.generator.fetch(results[index].payload()).await {
            Some(batch) if !batch.is_soft_failure() => {
                results[index].append(batch);
                self.refresh_gallery(origin, results, index).await;
                if let Err(e) = progress.delete().await {
                    warn!(error = %e, "Failed to remove progress notice");
                }
            }
            _ => {
                debug!(index, "Request produced no images");
                if let Err(e) = progress.edit_text(FAILURE_NOTICE).await {
                    warn!(error = %e, "Failed to report request failure");
                }
            }
        }

        Ok(())
    }

    async fn refresh_gallery(
        &self,
        origin: &IncomingMessage,
        results: &mut [GenerationResult],
        index: usize,
    ) {
        let chat = *origin.chat_id();

        for result in results[..=index].iter_mut() {
            for id in result.take_message_ids() {
                if let Err(e) = self.channel.delete_message(chat, id).await {
                    error!(error = %e, message = %id, "Failed to delete previous gallery message");
                }
            }
        }

        let gallery = build_gallery(&results[..=index]);
        if gallery.is_empty() {
            return;
        }

        match self.channel.send_gallery(chat, gallery).await {
            Ok(ids) => results[index].set_message_ids(ids),
            Err(e) => error!(error = %e, "Failed to send gallery"),
        }
    }
}
