//! Content-addressed cache of generated images.
//!
//! Payloads are fingerprinted with SHA-256 over their canonical JSON form, so
//! the same request asked twice (by any session) reaches the backend once.
//!
//! # Example
//!
//! ```no_run
//! use vermeer_cache::{CacheKey, DiskCache, ImageCache};
//! use vermeer_core::{ImageBatch, Payload};
//!
//! # async fn run(payload: Payload) -> Result<(), vermeer_error::StorageError> {
//! let cache = DiskCache::new("cache");
//! let key = CacheKey::from_payload(&payload);
//! if cache.get(&key).await?.is_none() {
//!     cache.set(&key, &ImageBatch::from(vec!["aGk=".to_string()])).await?;
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod config;
mod disk;
mod key;
mod memory;
mod store;

pub use config::CacheConfig;
pub use disk::DiskCache;
pub use key::CacheKey;
pub use memory::MemoryCache;
pub use store::ImageCache;
