//! Cache storage trait.

use async_trait::async_trait;
use vermeer_core::ImageBatch;
use vermeer_error::StorageResult;

use crate::CacheKey;

/// Persistent mapping from payload fingerprint to generated images.
///
/// Entries never expire. Implementations must tolerate concurrent readers
/// and writers from several sessions.
#[async_trait]
pub trait ImageCache: Send + Sync {
    /// Look up a stored batch.
    ///
    /// # Errors
    ///
    /// Returns an error when the backing store cannot be read.
    async fn get(&self, key: &CacheKey) -> StorageResult<Option<ImageBatch>>;

    /// Store a batch, replacing any previous entry.
    ///
    /// # Errors
    ///
    /// Returns an error when the entry cannot be written.
    async fn set(&self, key: &CacheKey, value: &ImageBatch) -> StorageResult<()>;
}
