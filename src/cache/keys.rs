//! Cache Key Builder
//!
//! Deterministic key derivation from a namespace, identifiers, and structured
//! filter objects. Filter objects are canonicalized (object keys recursively
//! sorted) before hashing so that two logically equivalent filters always
//! produce the same key, regardless of field construction order, and so that
//! get/set and pattern invalidation agree on key shape.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use serde::Serialize;
use serde_json::Value;
use tracing::warn;

/// Delimiter between key parts.
const DELIMITER: char = ':';

/// Hash token used when a filter cannot be serialized; keeps the key valid
/// while the failure is logged and degrades to a shared bucket.
const FALLBACK_HASH: &str = "default";

// == Key Construction ==
/// Joins a namespace and stringified parts with the key delimiter.
pub fn build_key(namespace: &str, parts: &[&str]) -> String {
    let mut key = String::with_capacity(namespace.len() + parts.iter().map(|p| p.len() + 1).sum::<usize>());
    key.push_str(namespace);
    for part in parts {
        key.push(DELIMITER);
        key.push_str(part);
    }
    key
}

// == Filter Hashing ==
/// Produces a fixed-width hash token for any serializable filter object.
///
/// The value is serialized to JSON, canonicalized, and hashed, bounding key
/// length no matter how large the filter is.
pub fn filter_hash<T: Serialize>(filter: &T) -> String {
    match serde_json::to_value(filter) {
        Ok(value) => text_hash(&canonical_json(&value)),
        Err(err) => {
            warn!(error = %err, "failed to serialize filter for cache key");
            FALLBACK_HASH.to_string()
        }
    }
}

/// Hashes arbitrary text into a 16-hex-digit token.
pub fn text_hash(text: &str) -> String {
    let mut hasher = DefaultHasher::new();
    text.hash(&mut hasher);
    format!("{:016x}", hasher.finish())
}

// == Canonical JSON ==
/// Serializes a JSON value with object keys in sorted order at every level.
///
/// Numbers, booleans, and strings use serde_json's compact formatting, which
/// is deterministic for a given value.
pub fn canonical_json(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();

            out.push('{');
            for (index, key) in keys.iter().enumerate() {
                if index > 0 {
                    out.push(',');
                }
                write_canonical(&Value::String((*key).clone()), out);
                out.push(':');
                if let Some(inner) = map.get(*key) {
                    write_canonical(inner, out);
                }
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (index, item) in items.iter().enumerate() {
                if index > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}

// == Product Key Family ==
/// Keys and invalidation patterns for cached product reads.
pub mod product {
    use super::build_key;

    pub const NAMESPACE: &str = "product";
    /// Every product-scoped key.
    pub const PATTERN: &str = "product:*";
    /// Every paged/filtered list key.
    pub const ALL_PATTERN: &str = "product:all:*";
    /// Every cached search result key.
    pub const SEARCH_PATTERN: &str = "product:search:*";
    /// Every structured-filter result key.
    pub const FILTER_PATTERN: &str = "product:filter:*";

    pub fn by_id(id: &str) -> String {
        build_key(NAMESPACE, &["id", id])
    }

    pub fn by_category(category_id: &str, page: u32, limit: u32) -> String {
        build_key(
            NAMESPACE,
            &["category", category_id, &page.to_string(), &limit.to_string()],
        )
    }

    pub fn by_user(user_id: &str, page: u32, limit: u32) -> String {
        build_key(
            NAMESPACE,
            &["user", user_id, &page.to_string(), &limit.to_string()],
        )
    }

    pub fn all(page: u32, limit: u32, filter_hash: &str) -> String {
        build_key(
            NAMESPACE,
            &["all", &page.to_string(), &limit.to_string(), filter_hash],
        )
    }

    pub fn search(query: &str, page: u32, limit: u32) -> String {
        build_key(
            NAMESPACE,
            &[
                "search",
                &super::text_hash(query),
                &page.to_string(),
                &limit.to_string(),
            ],
        )
    }

    pub fn filtered(filter_hash: &str) -> String {
        build_key(NAMESPACE, &["filter", filter_hash])
    }

    /// Invalidation pattern for every page cached under one category.
    pub fn category_pattern(category_id: &str) -> String {
        build_key(NAMESPACE, &["category", category_id, "*"])
    }

    /// Invalidation pattern for every page cached under one owner.
    pub fn user_pattern(user_id: &str) -> String {
        build_key(NAMESPACE, &["user", user_id, "*"])
    }
}

// == Namespace Invalidation ==
/// Bulk-invalidation pattern covering one namespace, for admin tooling.
pub fn namespace_pattern(namespace: &str) -> String {
    build_key(namespace, &["*"])
}

// == Search Key Family ==
/// Keys owned by the search orchestrator: composed results, analytics
/// records, frequency counters, and autocomplete candidates.
pub mod search {
    use super::{build_key, text_hash};

    pub const NAMESPACE: &str = "search";
    /// Every search-scoped key (results, analytics, counters, popular terms).
    pub const PATTERN: &str = "search:*";
    pub const ANALYTICS_PATTERN: &str = "search:analytics:*";
    pub const FREQUENCY_PATTERN: &str = "search:frequency:*";
    pub const FREQUENCY_PREFIX: &str = "search:frequency:";
    /// Cached list of popular search terms used for suggestions.
    pub const POPULAR_TERMS: &str = "search:popular_terms";

    pub fn results(
        query: &str,
        filter_hash: &str,
        page: u32,
        limit: u32,
        include_inactive: bool,
        fuzzy: bool,
    ) -> String {
        build_key(
            NAMESPACE,
            &[
                "results",
                &text_hash(query),
                filter_hash,
                &page.to_string(),
                &limit.to_string(),
                &include_inactive.to_string(),
                &fuzzy.to_string(),
            ],
        )
    }

    pub fn analytics(timestamp_us: i64) -> String {
        build_key(NAMESPACE, &["analytics", &timestamp_us.to_string()])
    }

    pub fn frequency(query: &str) -> String {
        build_key(NAMESPACE, &["frequency", query])
    }

    pub fn autocomplete(query: &str) -> String {
        build_key("autocomplete", &[query])
    }
}
