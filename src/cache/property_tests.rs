//! Property-Based Tests for the Cache Module
//!
//! Uses proptest to verify store-level correctness properties over generated
//! operation sequences and key populations.

use proptest::prelude::*;
use serde_json::json;

use crate::cache::keys;
use crate::cache::{CacheStore, GlobPattern};

// == Test Configuration ==
const TEST_MAX_ENTRIES: usize = 100;
const TEST_DEFAULT_TTL: u64 = 300;

// == Strategies ==
/// Generates valid cache keys.
fn key_strategy() -> impl Strategy<Value = String> {
    "[a-z0-9_:]{1,48}"
}

/// Generates JSON-ish string values.
fn value_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ]{0,64}"
}

#[derive(Debug, Clone)]
enum CacheOp {
    Set { key: String, value: String },
    Get { key: String },
    Delete { key: String },
    Increment { key: String, delta: i64 },
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        (key_strategy(), value_strategy())
            .prop_map(|(key, value)| CacheOp::Set { key, value }),
        key_strategy().prop_map(|key| CacheOp::Get { key }),
        key_strategy().prop_map(|key| CacheOp::Delete { key }),
        (key_strategy(), -5i64..5).prop_map(|(key, delta)| CacheOp::Increment { key, delta }),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // For any sequence of operations, hit/miss counters reflect exactly the
    // lookups that occurred (increment performs one internal lookup).
    #[test]
    fn prop_statistics_accuracy(ops in prop::collection::vec(cache_op_strategy(), 1..50)) {
        let mut store = CacheStore::new(TEST_MAX_ENTRIES, TEST_DEFAULT_TTL);
        let mut expected_hits: u64 = 0;
        let mut expected_misses: u64 = 0;
        let mut live: std::collections::HashSet<String> = std::collections::HashSet::new();

        for op in ops {
            match op {
                CacheOp::Set { key, value } => {
                    store.set(key.clone(), json!(value), None);
                    live.insert(key);
                }
                CacheOp::Get { key } => {
                    if store.get(&key).is_some() {
                        expected_hits += 1;
                    } else {
                        expected_misses += 1;
                    }
                }
                CacheOp::Delete { key } => {
                    store.delete(&key);
                    live.remove(&key);
                }
                CacheOp::Increment { key, delta } => {
                    // Routed through get(); counts one hit or miss.
                    if live.contains(&key) {
                        expected_hits += 1;
                    } else {
                        expected_misses += 1;
                    }
                    store.increment(&key, delta);
                    live.insert(key);
                }
            }
        }

        let stats = store.stats();
        prop_assert_eq!(stats.hits, expected_hits, "hits mismatch");
        prop_assert_eq!(stats.misses, expected_misses, "misses mismatch");
        prop_assert_eq!(stats.total_entries, store.len(), "entry count mismatch");
    }

    // For any key-value pair, a set followed by a get (before expiry)
    // returns the exact value stored.
    #[test]
    fn prop_roundtrip_storage(key in key_strategy(), value in value_strategy()) {
        let mut store = CacheStore::new(TEST_MAX_ENTRIES, TEST_DEFAULT_TTL);

        store.set(key.clone(), json!(value), None);

        prop_assert_eq!(store.get(&key), Some(json!(value)));
    }

    // Storing V1 then V2 under one key leaves exactly one entry holding V2.
    #[test]
    fn prop_overwrite_semantics(
        key in key_strategy(),
        value1 in value_strategy(),
        value2 in value_strategy()
    ) {
        let mut store = CacheStore::new(TEST_MAX_ENTRIES, TEST_DEFAULT_TTL);

        store.set(key.clone(), json!(value1), None);
        store.set(key.clone(), json!(value2), None);

        prop_assert_eq!(store.get(&key), Some(json!(value2)));
        prop_assert_eq!(store.len(), 1);
    }

    // After delete, a key is gone.
    #[test]
    fn prop_delete_removes_entry(key in key_strategy(), value in value_strategy()) {
        let mut store = CacheStore::new(TEST_MAX_ENTRIES, TEST_DEFAULT_TTL);

        store.set(key.clone(), json!(value), None);
        prop_assert!(store.get(&key).is_some());

        store.delete(&key);
        prop_assert!(store.get(&key).is_none());
    }

    // The entry count never exceeds the capacity bound, no matter how many
    // distinct keys are inserted.
    #[test]
    fn prop_capacity_enforcement(
        entries in prop::collection::vec((key_strategy(), value_strategy()), 1..300)
    ) {
        let max_entries = 50;
        let mut store = CacheStore::new(max_entries, TEST_DEFAULT_TTL);

        for (key, value) in entries {
            store.set(key, json!(value), None);
            prop_assert!(
                store.len() <= max_entries,
                "cache size {} exceeds max {}",
                store.len(),
                max_entries
            );
        }
    }

    // Pattern deletion removes exactly the matching family and nothing else.
    #[test]
    fn prop_pattern_delete_scoped_to_family(
        family_id in "[a-z0-9]{1,8}",
        other_id in "[a-z0-9]{1,8}",
        pages in 1u32..6
    ) {
        prop_assume!(family_id != other_id);

        let mut store = CacheStore::new(TEST_MAX_ENTRIES, TEST_DEFAULT_TTL);
        for page in 1..=pages {
            store.set(keys::product::by_category(&family_id, page, 10), json!([]), None);
            store.set(keys::product::by_category(&other_id, page, 10), json!([]), None);
        }

        let removed = store.delete_pattern(&keys::product::category_pattern(&family_id));

        prop_assert_eq!(removed, pages as usize);
        for page in 1..=pages {
            prop_assert!(!store.exists(&keys::product::by_category(&family_id, page, 10)));
            prop_assert!(store.exists(&keys::product::by_category(&other_id, page, 10)));
        }
    }

    // Increment is a running sum from zero for any delta sequence.
    #[test]
    fn prop_increment_running_sum(
        key in key_strategy(),
        deltas in prop::collection::vec(-100i64..100, 1..20)
    ) {
        let mut store = CacheStore::new(TEST_MAX_ENTRIES, TEST_DEFAULT_TTL);
        let mut sum = 0i64;

        for delta in deltas {
            sum += delta;
            prop_assert_eq!(store.increment(&key, delta), sum);
        }
    }

    // A compiled glob agrees with the naive contains/prefix/suffix reading
    // for single-wildcard patterns.
    #[test]
    fn prop_glob_single_wildcard(prefix in "[a-z:]{0,10}", suffix in "[a-z:]{0,10}", key in "[a-z:]{0,24}") {
        let pattern = format!("{prefix}*{suffix}");
        let glob = GlobPattern::compile(&pattern);

        let naive = key.len() >= prefix.len() + suffix.len()
            && key.starts_with(&prefix)
            && key.ends_with(&suffix);

        prop_assert_eq!(glob.matches(&key), naive, "pattern {} vs key {}", pattern, key);
    }
}
