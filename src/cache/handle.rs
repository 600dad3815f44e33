//! Cache Handle Module
//!
//! Cheaply clonable handle over the shared [`CacheStore`], exposing a typed
//! async facade. This is the surface the repository wrapper, the search
//! orchestrator, and the admin API consume.
//!
//! The handle is where the "cache is never a source of request failure" rule
//! lives: serialization problems degrade to a miss on read and a no-op on
//! write, logged and swallowed. Only the supplier passed to [`Cache::get_or_set`]
//! can fail, and that failure belongs to the caller.

use std::future::Future;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::warn;

use crate::cache::{CacheStats, CacheStore};

// == Cache ==
/// Shared, process-wide cache handle.
#[derive(Clone)]
pub struct Cache {
    store: Arc<RwLock<CacheStore>>,
}

impl Cache {
    // == Constructors ==
    /// Creates a handle over a fresh store. Tests construct isolated
    /// instances this way; the process bootstrap owns the sweep task.
    pub fn new(max_entries: usize, default_ttl: u64) -> Self {
        Self::from_store(CacheStore::new(max_entries, default_ttl))
    }

    /// Wraps an existing store.
    pub fn from_store(store: CacheStore) -> Self {
        Self {
            store: Arc::new(RwLock::new(store)),
        }
    }

    // == Get ==
    /// Returns the cached value for `key`, or None on miss.
    ///
    /// A value that no longer deserializes into `T` is dropped and treated
    /// as a miss.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let mut store = self.store.write().await;
        let value = store.get(key)?;

        match serde_json::from_value(value) {
            Ok(typed) => Some(typed),
            Err(err) => {
                warn!(key, error = %err, "cached value failed to deserialize; treating as miss");
                store.delete(key);
                None
            }
        }
    }

    // == Set ==
    /// Stores a value under `key`. Uses the store's default TTL when `ttl`
    /// is None. Serialization failures are logged and dropped.
    pub async fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T, ttl: Option<u64>) {
        match serde_json::to_value(value) {
            Ok(json) => {
                self.store.write().await.set(key.to_string(), json, ttl);
            }
            Err(err) => {
                warn!(key, error = %err, "value failed to serialize; cache write dropped");
            }
        }
    }

    // == Get Or Set ==
    /// Cache-aside read: returns the cached value on hit; on miss, invokes
    /// the supplier, caches its result (empty collections included), and
    /// returns it. A supplier error propagates unchanged and caches nothing.
    ///
    /// The lock is not held across the supplier await, so two concurrent
    /// misses for one key may both invoke their suppliers; the last write
    /// wins. Acceptable for this read-mostly workload.
    pub async fn get_or_set<T, E, F, Fut>(
        &self,
        key: &str,
        ttl_seconds: u64,
        fetch: F,
    ) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(cached) = self.get::<T>(key).await {
            return Ok(cached);
        }

        let value = fetch().await?;
        self.set(key, &value, Some(ttl_seconds)).await;
        Ok(value)
    }

    // == Delete ==
    /// Removes one entry. Returns whether an entry was removed.
    pub async fn delete(&self, key: &str) -> bool {
        self.store.write().await.delete(key)
    }

    // == Delete Pattern ==
    /// Removes every key matching the glob pattern. Returns the count.
    pub async fn delete_pattern(&self, pattern: &str) -> usize {
        self.store.write().await.delete_pattern(pattern)
    }

    // == Exists ==
    /// Expiry-aware presence check; does not affect hit/miss counters.
    pub async fn exists(&self, key: &str) -> bool {
        self.store.write().await.exists(key)
    }

    // == Increment ==
    /// Counter increment; absent keys start at 0, and the written value gets
    /// the default TTL.
    pub async fn increment(&self, key: &str, delta: i64) -> i64 {
        self.store.write().await.increment(key, delta)
    }

    // == Expire ==
    /// Updates only the expiry of an existing entry; no-op when absent.
    pub async fn expire(&self, key: &str, ttl_seconds: u64) -> bool {
        self.store.write().await.expire(key, ttl_seconds)
    }

    // == Keys Matching ==
    /// Unexpired keys matching a glob pattern.
    pub async fn keys_matching(&self, pattern: &str) -> Vec<String> {
        self.store.read().await.keys_matching(pattern)
    }

    // == Sweep ==
    /// Runs one maintenance pass; returns `(expired_removed, evicted)`.
    pub async fn sweep(&self) -> (usize, usize) {
        self.store.write().await.sweep()
    }

    // == Stats ==
    /// Snapshot of cache statistics.
    pub async fn stats(&self) -> CacheStats {
        self.store.read().await.stats()
    }

    /// Configured capacity bound.
    pub async fn max_entries(&self) -> usize {
        self.store.read().await.max_entries()
    }

    // == Clear ==
    /// Removes every entry and resets counters.
    pub async fn clear(&self) {
        self.store.write().await.clear();
    }

    /// Current entry count.
    pub async fn len(&self) -> usize {
        self.store.read().await.len()
    }

    /// Returns true when the cache holds no entries.
    pub async fn is_empty(&self) -> bool {
        self.store.read().await.is_empty()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_typed_roundtrip() {
        let cache = Cache::new(100, 300);

        cache.set("nums", &vec![1, 2, 3], None).await;
        let values: Option<Vec<i32>> = cache.get("nums").await;

        assert_eq!(values, Some(vec![1, 2, 3]));
    }

    #[tokio::test]
    async fn test_type_mismatch_degrades_to_miss() {
        let cache = Cache::new(100, 300);

        cache.set("key", &"not a number", None).await;
        let value: Option<u64> = cache.get("key").await;

        assert_eq!(value, None);
        // The poisoned entry is gone; a retyped write works.
        assert!(!cache.exists("key").await);
    }

    #[tokio::test]
    async fn test_get_or_set_invokes_supplier_once() {
        let cache = Cache::new(100, 300);
        let calls = AtomicUsize::new(0);

        for _ in 0..2 {
            let result: Result<Vec<String>, String> = cache
                .get_or_set("products", 60, || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(Vec::new())
                })
                .await;
            assert_eq!(result, Ok(Vec::new()));
        }

        // An empty result is still a cacheable result.
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_get_or_set_propagates_supplier_error() {
        let cache = Cache::new(100, 300);

        let result: Result<String, String> = cache
            .get_or_set("key", 60, || async { Err("store down".to_string()) })
            .await;

        assert_eq!(result, Err("store down".to_string()));
        assert!(!cache.exists("key").await, "failed fetch caches nothing");
    }

    #[tokio::test]
    async fn test_get_or_set_caches_none_result() {
        let cache = Cache::new(100, 300);
        let calls = AtomicUsize::new(0);

        for _ in 0..2 {
            let result: Result<Option<String>, String> = cache
                .get_or_set("missing_entity", 60, || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(None)
                })
                .await;
            assert_eq!(result, Ok(None));
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1, "absent lookups are cached too");
    }

    #[tokio::test]
    async fn test_increment_and_expire() {
        let cache = Cache::new(100, 300);

        assert_eq!(cache.increment("counter", 1).await, 1);
        assert_eq!(cache.increment("counter", 2).await, 3);
        assert!(cache.expire("counter", 600).await);
        assert!(!cache.expire("missing", 600).await);
    }

    #[tokio::test]
    async fn test_clear_and_stats() {
        let cache = Cache::new(100, 300);

        cache.set("a", &1, None).await;
        let _: Option<i32> = cache.get("a").await;
        cache.clear().await;

        let stats = cache.stats().await;
        assert_eq!(stats.hits, 0);
        assert!(cache.is_empty().await);
    }
}
