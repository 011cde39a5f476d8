//! Per-request accumulation inside one generation session.

use crate::{ImageBatch, MessageId, Payload};
use derive_getters::Getters;

/// Images and sent messages for one planned request.
///
/// Images only grow. Message ids are replaced wholesale each time the
/// gallery is re-sent.
#[derive(Debug, Clone, PartialEq, Getters)]
pub struct GenerationResult {
    /// Request body that produced the images
    payload: Payload,
    /// Base64 images received so far
    images: Vec<String>,
    /// Gallery messages currently attributed to this request
    message_ids: Vec<MessageId>,
}

impl GenerationResult {
    /// Starts an empty result for a payload.
    pub fn new(payload: Payload) -> Self {
        Self {
            payload,
            images: Vec::new(),
            message_ids: Vec::new(),
        }
    }

    /// One empty result per planned payload, in plan order.
    pub fn for_plan(payloads: Vec<Payload>) -> Vec<Self> {
        payloads.into_iter().map(Self::new).collect()
    }

    /// Appends the present images of a batch.
    pub fn append(&mut self, batch: ImageBatch) {
        self.images.extend(batch.into_images());
    }

    /// Replaces the recorded gallery messages.
    pub fn set_message_ids(&mut self, ids: Vec<MessageId>) {
        self.message_ids = ids;
    }

    /// Removes and returns the recorded gallery messages.
    pub fn take_message_ids(&mut self) -> Vec<MessageId> {
        std::mem::take(&mut self.message_ids)
    }
}
