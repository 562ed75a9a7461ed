//! Memoization of search results

use super::traits::CacheStore;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

const KEY_PREFIX: &str = "bibresolve-";

/// Derive the cache key for a (query, fields, endpoint selector) tuple.
///
/// Every component is length-prefixed before hashing, so tuples that only
/// differ in where one string ends and the next begins never alias.
pub fn cache_key(query: &str, fields: &[&str], selector: &str) -> String {
    let mut hasher = Sha256::new();
    update_prefixed(&mut hasher, query.as_bytes());
    hasher.update((fields.len() as u64).to_le_bytes());
    for field in fields {
        update_prefixed(&mut hasher, field.as_bytes());
    }
    update_prefixed(&mut hasher, selector.as_bytes());
    format!("{}{:x}", KEY_PREFIX, hasher.finalize())
}

fn update_prefixed(hasher: &mut Sha256, bytes: &[u8]) {
    hasher.update((bytes.len() as u64).to_le_bytes());
    hasher.update(bytes);
}

/// Best-effort, TTL-bounded memoization in front of a [`CacheStore`].
///
/// Store failures never abort a lookup: a failed or undecodable read is a
/// miss, and a failed write is logged and dropped. Empty results are cached
/// like any other.
#[derive(Clone)]
pub struct ResultCache {
    store: Arc<dyn CacheStore>,
    ttl: Duration,
}

impl ResultCache {
    pub fn new(store: Arc<dyn CacheStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Return the cached value for the tuple, or run `compute` and cache it.
    ///
    /// An error from `compute` is returned as-is and nothing is stored.
    pub async fn get_or_compute<T, E, F, Fut>(
        &self,
        query: &str,
        fields: &[&str],
        selector: &str,
        compute: F,
    ) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let key = cache_key(query, fields, selector);

        match self.store.get(&key).await {
            Ok(Some(bytes)) => match serde_json::from_slice::<T>(&bytes) {
                Ok(value) => {
                    tracing::debug!(%key, %query, "cache hit");
                    return Ok(value);
                }
                Err(e) => tracing::debug!(%key, error = %e, "undecodable cache entry, recomputing"),
            },
            Ok(None) => tracing::debug!(%key, %query, "cache miss"),
            Err(e) => tracing::warn!(%key, error = %e, "cache read failed, recomputing"),
        }

        let value = compute().await?;

        match serde_json::to_vec(&value) {
            Ok(bytes) => {
                if let Err(e) = self.store.set(&key, &bytes, self.ttl).await {
                    tracing::warn!(%key, error = %e, "cache write failed");
                }
            }
            Err(e) => tracing::warn!(%key, error = %e, "could not encode value for cache"),
        }

        Ok(value)
    }
}

impl std::fmt::Debug for ResultCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultCache").field("ttl", &self.ttl).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheError, CacheResult, MemoryStore};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Store whose every operation fails, like an unreachable cache server.
    struct DownStore;

    #[async_trait]
    impl CacheStore for DownStore {
        async fn get(&self, _key: &str) -> CacheResult<Option<Vec<u8>>> {
            Err(CacheError::Unavailable("connection refused".to_string()))
        }

        async fn set(&self, _key: &str, _value: &[u8], _ttl: Duration) -> CacheResult<()> {
            Err(CacheError::Unavailable("connection refused".to_string()))
        }
    }

    fn memory_cache() -> ResultCache {
        ResultCache::new(Arc::new(MemoryStore::new()), Duration::from_secs(60))
    }

    async fn counted(
        cache: &ResultCache,
        calls: &AtomicUsize,
        query: &str,
        result: Vec<String>,
    ) -> Result<Vec<String>, String> {
        cache
            .get_or_compute(query, &["title_s"], "search", move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, String>(result)
            })
            .await
    }

    #[test]
    fn key_is_deterministic_and_prefixed() {
        let a = cache_key("title_s:\"x\"~3", &["title_s", "uri_s"], "search");
        let b = cache_key("title_s:\"x\"~3", &["title_s", "uri_s"], "search");
        assert_eq!(a, b);
        assert!(a.starts_with(KEY_PREFIX));
        // sha256 hex
        assert_eq!(a.len(), KEY_PREFIX.len() + 64);
    }

    #[test]
    fn key_differs_per_component() {
        let base = cache_key("q", &["a", "b"], "search");
        assert_ne!(base, cache_key("q2", &["a", "b"], "search"));
        assert_ne!(base, cache_key("q", &["a"], "search"));
        assert_ne!(base, cache_key("q", &["b", "a"], "search"));
        assert_ne!(base, cache_key("q", &["a", "b"], "ref/author"));
    }

    #[test]
    fn key_is_not_fooled_by_shifted_boundaries() {
        assert_ne!(cache_key("ab", &["c"], "d"), cache_key("a", &["bc"], "d"));
        assert_ne!(cache_key("q", &["ab"], "s"), cache_key("q", &["a", "b"], "s"));
        assert_ne!(cache_key("q", &[], "fs"), cache_key("q", &["f"], "s"));
    }

    #[tokio::test]
    async fn second_call_hits_cache() {
        let cache = memory_cache();
        let calls = AtomicUsize::new(0);

        let first = counted(&cache, &calls, "q", vec!["doc".into()]).await.unwrap();
        let second = counted(&cache, &calls, "q", vec!["other".into()]).await.unwrap();

        assert_eq!(first, vec!["doc".to_string()]);
        assert_eq!(second, first);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn empty_results_are_cached() {
        let cache = memory_cache();
        let calls = AtomicUsize::new(0);

        counted(&cache, &calls, "nothing", vec![]).await.unwrap();
        let again = counted(&cache, &calls, "nothing", vec!["late".into()]).await.unwrap();

        assert!(again.is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn unavailable_store_degrades_to_compute() {
        let cache = ResultCache::new(Arc::new(DownStore), Duration::from_secs(60));
        let calls = AtomicUsize::new(0);

        let first = counted(&cache, &calls, "q", vec!["doc".into()]).await.unwrap();
        let second = counted(&cache, &calls, "q", vec!["doc".into()]).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn compute_error_is_not_cached() {
        let cache = memory_cache();

        let failed: Result<Vec<String>, String> = cache
            .get_or_compute("q", &["f"], "search", || async { Err("boom".to_string()) })
            .await;
        assert_eq!(failed.unwrap_err(), "boom");

        let retried: Result<Vec<String>, String> = cache
            .get_or_compute("q", &["f"], "search", || async { Ok(vec!["ok".to_string()]) })
            .await;
        assert_eq!(retried.unwrap(), vec!["ok".to_string()]);
    }

    #[tokio::test]
    async fn undecodable_entry_is_recomputed() {
        let store = Arc::new(MemoryStore::new());
        let key = cache_key("q", &["title_s"], "search");
        store.set(&key, b"not json", Duration::from_secs(60)).await.unwrap();

        let cache = ResultCache::new(store, Duration::from_secs(60));
        let calls = AtomicUsize::new(0);
        let value = counted(&cache, &calls, "q", vec!["fresh".into()]).await.unwrap();

        assert_eq!(value, vec!["fresh".to_string()]);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
