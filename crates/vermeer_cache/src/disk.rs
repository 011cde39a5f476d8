//! Directory-backed cache store.
//!
//! Layout: `<root>/<first two hex chars>/<key>.json`, each file holding the
//! JSON list of base64 images. Writes go to a sibling temp file that is then
//! renamed over the entry, so readers see either the old entry or the whole
//! new one.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tracing::{debug, instrument, warn};
use vermeer_core::ImageBatch;
use vermeer_error::{StorageError, StorageErrorKind, StorageResult};

use crate::{CacheKey, ImageCache};

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Cache persisted as one JSON file per entry.
#[derive(Debug, Clone, derive_getters::Getters)]
pub struct DiskCache {
    root: PathBuf,
}

impl DiskCache {
    /// Use `root` as the cache directory. It is created lazily on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Path of the file holding `key`.
    pub fn entry_path(&self, key: &CacheKey) -> PathBuf {
        self.root
            .join(key.shard())
            .join(format!("{}.json", key.as_str()))
    }

    fn temp_path(entry: &Path) -> PathBuf {
        let n = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
        let mut name = entry.as_os_str().to_owned();
        name.push(format!(".tmp-{}-{}", std::process::id(), n));
        PathBuf::from(name)
    }
}

#[async_trait]
impl ImageCache for DiskCache {
    #[instrument(skip(self), fields(cache_key = %key))]
    async fn get(&self, key: &CacheKey) -> StorageResult<Option<ImageBatch>> {
        let path = self.entry_path(key);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("Cache miss");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_slice::<ImageBatch>(&bytes) {
            Ok(batch) => {
                debug!(entries = batch.entries().len(), "Cache hit");
                Ok(Some(batch))
            }
            Err(e) => {
                let err = StorageError::new(StorageErrorKind::Corrupt {
                    key: key.to_string(),
                    reason: e.to_string(),
                });
                warn!(error = %err, path = %path.display(), "Ignoring unreadable cache entry");
                Ok(None)
            }
        }
    }

    #[instrument(skip(self, value), fields(cache_key = %key))]
    async fn set(&self, key: &CacheKey, value: &ImageBatch) -> StorageResult<()> {
        let path = self.entry_path(key);
        let body = serde_json::to_vec(value)
            .map_err(|e| StorageError::new(StorageErrorKind::Serialization(e.to_string())))?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let temp = Self::temp_path(&path);
        tokio::fs::write(&temp, &body).await?;
        if let Err(e) = tokio::fs::rename(&temp, &path).await {
            let _ = tokio::fs::remove_file(&temp).await;
            return Err(e.into());
        }

        debug!(bytes = body.len(), "Cache entry stored");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_path_is_sharded() {
        let cache = DiskCache::new("/var/cache/vermeer");
        let key = CacheKey::from_canonical("{}");
        let path = cache.entry_path(&key);
        assert_eq!(
            path,
            PathBuf::from("/var/cache/vermeer/44").join(format!("{}.json", key))
        );
    }

    #[test]
    fn test_temp_paths_are_unique_siblings() {
        let entry = PathBuf::from("/tmp/ab/abcd.json");
        let a = DiskCache::temp_path(&entry);
        let b = DiskCache::temp_path(&entry);
        assert_ne!(a, b);
        assert_eq!(a.parent(), entry.parent());
    }
}
