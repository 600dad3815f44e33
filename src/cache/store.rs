//! Cache Store Module
//!
//! Main cache engine: a key-value map with per-entry TTL expiry, a capacity
//! bound enforced by soonest-to-expire eviction, and glob-based bulk
//! deletion. Eviction deliberately removes the entries closest to expiry
//! instead of tracking access order; the bound on steady-state memory is the
//! same and no per-access bookkeeping is needed.

use std::collections::HashMap;

use serde_json::Value;
use tracing::debug;

use crate::cache::entry::current_timestamp_ms;
use crate::cache::{CacheEntry, CacheStats, GlobPattern};

/// Share of `max_entries` removed by one eviction pass.
const EVICTION_SHARE: usize = 10;

// == Cache Store ==
/// In-memory store with TTL expiry and capacity-bounded eviction.
///
/// All operations are infallible from the caller's perspective: a lookup
/// either yields a value or behaves as a miss. The store is wrapped by
/// [`crate::cache::Cache`] for shared async access.
#[derive(Debug)]
pub struct CacheStore {
    /// Key-value storage
    entries: HashMap<String, CacheEntry>,
    /// Performance statistics
    stats: CacheStats,
    /// Maximum number of entries allowed
    max_entries: usize,
    /// Default TTL in seconds for entries without explicit TTL
    default_ttl: u64,
}

impl CacheStore {
    // == Constructor ==
    /// Creates a new CacheStore with the given capacity and default TTL.
    pub fn new(max_entries: usize, default_ttl: u64) -> Self {
        Self {
            entries: HashMap::new(),
            stats: CacheStats::new(),
            max_entries,
            default_ttl,
        }
    }

    // == Get ==
    /// Retrieves a value by key.
    ///
    /// A present-but-expired entry is removed as a side effect of the lookup
    /// and counted as a miss.
    pub fn get(&mut self, key: &str) -> Option<Value> {
        match self.entries.get(key) {
            Some(entry) if entry.is_expired() => {
                self.entries.remove(key);
                self.stats.record_expired();
                self.stats.record_miss();
                self.stats.set_total_entries(self.entries.len());
                None
            }
            Some(entry) => {
                let value = entry.value.clone();
                self.stats.record_hit();
                Some(value)
            }
            None => {
                self.stats.record_miss();
                None
            }
        }
    }

    // == Set ==
    /// Inserts or overwrites an entry.
    ///
    /// Uses `default_ttl` when `ttl` is None. If the key is new and the store
    /// is at or over capacity, an eviction pass runs first.
    pub fn set(&mut self, key: String, value: Value, ttl: Option<u64>) {
        let is_new = !self.entries.contains_key(&key);
        if is_new && self.entries.len() >= self.max_entries {
            self.evict_soonest(self.eviction_batch());
        }

        let effective_ttl = ttl.unwrap_or(self.default_ttl);
        self.entries.insert(key, CacheEntry::new(value, effective_ttl));
        self.stats.set_total_entries(self.entries.len());
    }

    // == Delete ==
    /// Removes an entry by key. Returns whether an entry was removed.
    pub fn delete(&mut self, key: &str) -> bool {
        let removed = self.entries.remove(key).is_some();
        if removed {
            self.stats.set_total_entries(self.entries.len());
        }
        removed
    }

    // == Delete Pattern ==
    /// Removes every key matching a glob pattern, where `*` matches any
    /// substring. Returns the number of entries removed.
    pub fn delete_pattern(&mut self, pattern: &str) -> usize {
        let glob = GlobPattern::compile(pattern);
        let matched: Vec<String> = self
            .entries
            .keys()
            .filter(|key| glob.matches(key))
            .cloned()
            .collect();

        let count = matched.len();
        for key in matched {
            self.entries.remove(&key);
        }

        if count > 0 {
            self.stats.set_total_entries(self.entries.len());
            debug!(pattern, removed = count, "cache pattern delete");
        }
        count
    }

    // == Exists ==
    /// Same expiry semantics as `get`, but does not touch the hit/miss
    /// counters.
    pub fn exists(&mut self, key: &str) -> bool {
        match self.entries.get(key) {
            Some(entry) if entry.is_expired() => {
                self.entries.remove(key);
                self.stats.record_expired();
                self.stats.set_total_entries(self.entries.len());
                false
            }
            Some(_) => true,
            None => false,
        }
    }

    // == Increment ==
    /// Read-modify-write counter. An absent (or non-numeric) value is treated
    /// as 0. The result is written back with the default TTL, so the counter
    /// window resets on every increment.
    pub fn increment(&mut self, key: &str, delta: i64) -> i64 {
        let current = self.get(key).and_then(|v| v.as_i64()).unwrap_or(0);
        let next = current + delta;
        self.set(key.to_string(), Value::from(next), None);
        next
    }

    // == Expire ==
    /// Updates only the expiry of an existing, unexpired entry. Returns
    /// whether an entry was updated; a no-op on absent keys.
    pub fn expire(&mut self, key: &str, ttl_seconds: u64) -> bool {
        match self.entries.get_mut(key) {
            Some(entry) if !entry.is_expired() => {
                entry.expires_at = current_timestamp_ms() + ttl_seconds * 1000;
                true
            }
            _ => false,
        }
    }

    // == Keys Matching ==
    /// Returns the unexpired keys matching a glob pattern.
    pub fn keys_matching(&self, pattern: &str) -> Vec<String> {
        let glob = GlobPattern::compile(pattern);
        self.entries
            .iter()
            .filter(|(key, entry)| !entry.is_expired() && glob.matches(key))
            .map(|(key, _)| key.clone())
            .collect()
    }

    // == Cleanup Expired ==
    /// Removes all expired entries. Returns the number removed.
    pub fn cleanup_expired(&mut self) -> usize {
        let expired: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired())
            .map(|(key, _)| key.clone())
            .collect();

        let count = expired.len();
        for key in expired {
            self.entries.remove(&key);
            self.stats.record_expired();
        }

        self.stats.set_total_entries(self.entries.len());
        count
    }

    // == Evict Soonest ==
    /// Removes up to `count` entries with the nearest expiry. Returns the
    /// number evicted.
    pub fn evict_soonest(&mut self, count: usize) -> usize {
        let mut by_expiry: Vec<(String, u64)> = self
            .entries
            .iter()
            .map(|(key, entry)| (key.clone(), entry.expires_at))
            .collect();
        by_expiry.sort_by_key(|(_, expires_at)| *expires_at);

        let mut evicted = 0;
        for (key, _) in by_expiry.into_iter().take(count) {
            self.entries.remove(&key);
            self.stats.record_eviction();
            evicted += 1;
        }

        if evicted > 0 {
            self.stats.set_total_entries(self.entries.len());
            debug!(evicted, "cache eviction pass");
        }
        evicted
    }

    // == Sweep ==
    /// Background maintenance pass: drops expired entries, then evicts the
    /// soonest-to-expire batch if the store is still over capacity.
    ///
    /// Returns `(expired_removed, evicted)`.
    pub fn sweep(&mut self) -> (usize, usize) {
        let expired = self.cleanup_expired();
        let evicted = if self.entries.len() > self.max_entries {
            self.evict_soonest(self.eviction_batch())
        } else {
            0
        };
        (expired, evicted)
    }

    fn eviction_batch(&self) -> usize {
        (self.max_entries / EVICTION_SHARE).max(1)
    }

    // == Stats ==
    /// Returns a snapshot of current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    /// Maximum number of entries the store will hold after a sweep.
    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    // == Clear ==
    /// Removes every entry and resets the counters.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.stats = CacheStats::new();
    }

    /// Current number of entries (expired-but-unswept entries included).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::thread::sleep;
    use std::time::Duration;

    fn store() -> CacheStore {
        CacheStore::new(100, 300)
    }

    #[test]
    fn test_set_and_get() {
        let mut store = store();

        store.set("key1".to_string(), json!("value1"), None);
        assert_eq!(store.get("key1"), Some(json!("value1")));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_get_nonexistent_is_miss() {
        let mut store = store();

        assert_eq!(store.get("nope"), None);
        assert_eq!(store.stats().misses, 1);
    }

    #[test]
    fn test_overwrite_keeps_one_entry() {
        let mut store = store();

        store.set("key1".to_string(), json!(1), None);
        store.set("key1".to_string(), json!(2), None);

        assert_eq!(store.get("key1"), Some(json!(2)));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_delete() {
        let mut store = store();

        store.set("key1".to_string(), json!("value"), None);
        assert!(store.delete("key1"));
        assert!(!store.delete("key1"));
        assert!(store.is_empty());
    }

    #[test]
    fn test_ttl_expiration_on_get() {
        let mut store = store();

        store.set("key1".to_string(), json!("value"), Some(1));
        assert!(store.get("key1").is_some());

        sleep(Duration::from_millis(1100));

        assert_eq!(store.get("key1"), None);
        assert_eq!(store.len(), 0, "expired entry removed lazily");
        assert_eq!(store.stats().expired_removals, 1);
    }

    #[test]
    fn test_exists_does_not_affect_counters() {
        let mut store = store();

        store.set("key1".to_string(), json!("value"), None);
        assert!(store.exists("key1"));
        assert!(!store.exists("other"));

        let stats = store.stats();
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.misses, 0);
    }

    #[test]
    fn test_exists_removes_expired_entry() {
        let mut store = store();

        store.set("key1".to_string(), json!("value"), Some(1));
        sleep(Duration::from_millis(1100));

        assert!(!store.exists("key1"));
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn test_delete_pattern_mid_string() {
        let mut store = store();

        store.set("product:category:c1:1:10".to_string(), json!([]), None);
        store.set("product:category:c1:2:10".to_string(), json!([]), None);
        store.set("product:category:c2:1:10".to_string(), json!([]), None);

        let removed = store.delete_pattern("product:category:c1:*");

        assert_eq!(removed, 2);
        assert!(store.exists("product:category:c2:1:10"));
        assert!(!store.exists("product:category:c1:1:10"));
        assert!(!store.exists("product:category:c1:2:10"));
    }

    #[test]
    fn test_increment_from_absent() {
        let mut store = store();

        assert_eq!(store.increment("counter", 1), 1);
        assert_eq!(store.increment("counter", 1), 2);
        assert_eq!(store.increment("counter", 5), 7);
    }

    #[test]
    fn test_increment_resets_ttl_to_default() {
        let mut store = store();

        store.set("counter".to_string(), json!(3), Some(1));
        sleep(Duration::from_millis(500));

        // The write-back uses the default TTL, not the remaining one.
        store.increment("counter", 1);
        sleep(Duration::from_millis(700));

        assert_eq!(store.get("counter"), Some(json!(4)));
    }

    #[test]
    fn test_expire_updates_existing_only() {
        let mut store = store();

        store.set("key1".to_string(), json!("value"), Some(300));
        assert!(store.expire("key1", 1));
        assert!(!store.expire("missing", 1));

        sleep(Duration::from_millis(1100));
        assert_eq!(store.get("key1"), None);
    }

    #[test]
    fn test_eviction_when_at_capacity() {
        let mut store = CacheStore::new(10, 300);

        // Give distinct expiries so the eviction order is deterministic.
        for i in 0..10 {
            store.set(format!("key{i}"), json!(i), Some(60 + i));
        }
        store.set("key_new".to_string(), json!("new"), Some(300));

        assert!(store.len() <= 10);
        // key0 had the soonest expiry.
        assert!(!store.exists("key0"));
        assert!(store.exists("key_new"));
        assert!(store.stats().evictions >= 1);
    }

    #[test]
    fn test_capacity_bound_over_many_inserts() {
        let max = 50;
        let mut store = CacheStore::new(max, 300);

        for i in 0..(max + 1000) {
            store.set(format!("key{i}"), json!(i), None);
        }

        assert!(store.len() <= max);
    }

    #[test]
    fn test_cleanup_expired() {
        let mut store = store();

        store.set("short".to_string(), json!(1), Some(1));
        store.set("long".to_string(), json!(2), Some(60));

        sleep(Duration::from_millis(1100));

        let removed = store.cleanup_expired();
        assert_eq!(removed, 1);
        assert_eq!(store.len(), 1);
        assert!(store.get("long").is_some());
    }

    #[test]
    fn test_sweep_restores_capacity_bound() {
        let mut store = CacheStore::new(10, 300);
        for i in 0..10 {
            store.set(format!("key{i}"), json!(i), Some(600 + i));
        }
        // Overwrites never trigger eviction, so force excess directly.
        store.entries.insert(
            "extra1".to_string(),
            CacheEntry::new(json!(0), 600),
        );
        store.entries.insert(
            "extra2".to_string(),
            CacheEntry::new(json!(0), 600),
        );

        let (_, evicted) = store.sweep();
        assert!(evicted >= 1);
        assert!(store.len() <= 10);
    }

    #[test]
    fn test_keys_matching_skips_expired() {
        let mut store = store();

        store.set("search:frequency:shirt".to_string(), json!(3), Some(60));
        store.set("search:frequency:old".to_string(), json!(9), Some(1));
        store.set("search:analytics:1".to_string(), json!({}), Some(60));

        sleep(Duration::from_millis(1100));

        let mut keys = store.keys_matching("search:frequency:*");
        keys.sort();
        assert_eq!(keys, vec!["search:frequency:shirt".to_string()]);
    }

    #[test]
    fn test_clear_resets_counters() {
        let mut store = store();

        store.set("key1".to_string(), json!(1), None);
        store.get("key1");
        store.get("missing");
        store.clear();

        let stats = store.stats();
        assert!(store.is_empty());
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.misses, 0);
    }

    #[test]
    fn test_stats_accuracy() {
        let mut store = store();

        store.set("key1".to_string(), json!(1), None);
        store.get("key1");
        store.get("missing");

        let stats = store.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.total_entries, 1);
        assert!((stats.hit_rate() - 0.5).abs() < f64::EPSILON);
    }
}
