//! Cache configuration.

use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{DiskCache, ImageCache, MemoryCache};

/// Where generated images are cached.
#[derive(
    Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters, derive_setters::Setters,
)]
#[setters(prefix = "with_")]
#[serde(default)]
pub struct CacheConfig {
    /// Directory for the disk store
    directory: PathBuf,
    /// Keep entries in memory only
    in_memory: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("cache"),
            in_memory: false,
        }
    }
}

impl CacheConfig {
    /// Build the configured store.
    pub fn open(&self) -> Arc<dyn ImageCache> {
        if self.in_memory {
            Arc::new(MemoryCache::new())
        } else {
            Arc::new(DiskCache::new(self.directory.clone()))
        }
    }
}
