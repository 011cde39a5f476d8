//! Image batches returned by the generation backend.

use serde::{Deserialize, Serialize};

/// Ordered base64 images from one request.
///
/// Entries may be absent: a backend response without an `images` field is
/// recorded as a single `None` placeholder. A batch with no present entry
/// is a soft failure.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageBatch(Vec<Option<String>>);

impl ImageBatch {
    /// Wraps raw entries, absent ones included.
    pub fn new(entries: Vec<Option<String>>) -> Self {
        Self(entries)
    }

    /// Batch standing in for a response that carried no images.
    pub fn placeholder() -> Self {
        Self(vec![None])
    }

    /// Raw entries, absent ones included.
    pub fn entries(&self) -> &[Option<String>] {
        &self.0
    }

    /// Present images in order.
    pub fn images(&self) -> impl Iterator<Item = &str> {
        self.0.iter().filter_map(|entry| entry.as_deref())
    }

    /// True when no entry carries an image.
    pub fn is_soft_failure(&self) -> bool {
        self.images().next().is_none()
    }

    /// Consumes the batch, keeping present images only.
    pub fn into_images(self) -> Vec<String> {
        self.0.into_iter().flatten().collect()
    }
}

impl From<Vec<String>> for ImageBatch {
    fn from(images: Vec<String>) -> Self {
        Self(images.into_iter().map(Some).collect())
    }
}
