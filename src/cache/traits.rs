//! Cache store trait definitions

use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Errors raised by a cache backend.
///
/// These never escape [`ResultCache`](super::ResultCache): a failing store
/// degrades to a cache miss.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cache backend unavailable: {0}")]
    Unavailable(String),
}

/// Result type for cache operations
pub type CacheResult<T> = Result<T, CacheError>;

/// Key/value store with per-entry expiry
///
/// Implementations must be safe for concurrent get/set from several
/// in-flight requests. Concurrent writers to the same key are allowed to
/// race; the last one wins.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Fetch a live entry. Expired entries read as `None`.
    async fn get(&self, key: &str) -> CacheResult<Option<Vec<u8>>>;

    /// Store `value` under `key` for `ttl`
    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> CacheResult<()>;
}

/// Extension trait for opening persistent stores from paths
pub trait OpenStore: CacheStore + Sized {
    /// Open or create a store at the given path
    fn open(path: impl AsRef<Path>) -> CacheResult<Self>;

    /// Create an in-memory store (useful for testing)
    fn open_in_memory() -> CacheResult<Self>;
}
