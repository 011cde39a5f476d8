//! In-process cache store.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use vermeer_core::ImageBatch;
use vermeer_error::StorageResult;

use crate::{CacheKey, ImageCache};

/// Cache held in memory for the life of the process.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<CacheKey, ImageBatch>>,
}

impl MemoryCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// True when nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[async_trait]
impl ImageCache for MemoryCache {
    async fn get(&self, key: &CacheKey) -> StorageResult<Option<ImageBatch>> {
        Ok(self.entries.read().get(key).cloned())
    }

    async fn set(&self, key: &CacheKey, value: &ImageBatch) -> StorageResult<()> {
        self.entries.write().insert(key.clone(), value.clone());
        Ok(())
    }
}
