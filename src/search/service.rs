//! Search Service Module
//!
//! Turns free-text queries plus structured filters into cached, paginated
//! search results, with suggestion generation for empty result sets and
//! lightweight analytics counters on the side.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cache::{keys, Cache};
use crate::catalog::{ProductFilter, ProductPage, ProductRepository};
use crate::error::Result;
use crate::search::filters::{total_pages, SearchFilters, SearchOptions, SearchParams, SearchResult};

// == TTLs (seconds) ==
const SEARCH_RESULT_TTL: u64 = 5 * 60;
const AUTOCOMPLETE_TTL: u64 = 60 * 60;
const POPULAR_TERMS_TTL: u64 = 60 * 60;
const ANALYTICS_TTL: u64 = 24 * 60 * 60;

const MAX_SUGGESTIONS: usize = 5;
const TOP_QUERIES: usize = 10;

/// Fallback popular terms until analytics data accumulates.
const DEFAULT_POPULAR_TERMS: [&str; 10] = [
    "قميص", "بنطلون", "فستان", "حذاء", "حقيبة", "shirt", "pants", "dress", "shoes", "bag",
];

// == Analytics Records ==
/// One recorded search, kept in the cache store for a day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRecord {
    pub query: String,
    pub filters: SearchFilters,
    pub result_count: u64,
    pub search_time_ms: u64,
    pub timestamp: DateTime<Utc>,
}

/// Aggregated view over the retained search records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsSummary {
    pub total_searches: u64,
    pub average_search_time_ms: u64,
    pub popular_queries: Vec<QueryFrequency>,
    pub no_result_queries: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueryFrequency {
    pub query: String,
    pub count: i64,
}

// == Query Normalization ==
/// Trims, lowercases, strips characters outside alphanumerics and the Arabic
/// script range, and collapses internal whitespace, so queries differing
/// only in case, spacing, or punctuation share one cache entry.
pub fn normalize_query(query: &str) -> String {
    let kept: String = query
        .trim()
        .to_lowercase()
        .chars()
        .filter(|c| {
            c.is_alphanumeric() || c.is_whitespace() || ('\u{0600}'..='\u{06FF}').contains(c)
        })
        .collect();

    kept.split_whitespace().collect::<Vec<_>>().join(" ")
}

// == Search Service ==
pub struct SearchService {
    repository: Arc<dyn ProductRepository>,
    cache: Cache,
}

impl SearchService {
    pub fn new(repository: Arc<dyn ProductRepository>, cache: Cache) -> Self {
        Self { repository, cache }
    }

    // == Search ==
    /// Normalized, cached product search.
    ///
    /// On a cache hit the stored result is returned with `search_time_ms`
    /// recomputed for this call, so cache-served responses never report the
    /// original search's timing as their own.
    pub async fn search(
        &self,
        query: &str,
        filters: &SearchFilters,
        options: &SearchOptions,
    ) -> Result<SearchResult> {
        let started = Instant::now();

        let normalized = normalize_query(query);
        let validated = filters.validate();
        let params = options.normalize();

        let key = keys::search::results(
            &normalized,
            &keys::filter_hash(&validated),
            params.page,
            params.limit,
            params.include_inactive,
            params.fuzzy_search,
        );

        if let Some(mut cached) = self.cache.get::<SearchResult>(&key).await {
            cached.search_time_ms = started.elapsed().as_millis() as u64;
            return Ok(cached);
        }

        let page_data = self.perform_search(&normalized, &validated, &params).await?;
        let pages = total_pages(page_data.total, params.limit);
        let search_time_ms = started.elapsed().as_millis() as u64;

        let suggestions = if page_data.total == 0 && !normalized.is_empty() {
            Some(self.generate_suggestions(&normalized).await)
        } else {
            None
        };

        let result = SearchResult {
            products: page_data.products,
            total: page_data.total,
            page: params.page,
            total_pages: pages,
            has_next_page: params.page < pages,
            has_prev_page: params.page > 1,
            filters: validated,
            search_time_ms,
            suggestions,
        };

        self.cache.set(&key, &result, Some(SEARCH_RESULT_TTL)).await;
        self.record_analytics(&normalized, &result, search_time_ms).await;

        Ok(result)
    }

    /// Translates the validated search inputs into the store-query form and
    /// executes it against the repository.
    async fn perform_search(
        &self,
        query: &str,
        filters: &SearchFilters,
        params: &SearchParams,
    ) -> Result<ProductPage> {
        let store_filter = ProductFilter {
            name_query: (!query.is_empty()).then(|| query.to_string()),
            category_id: filters.category.clone(),
            min_price: filters.min_price,
            max_price: filters.max_price,
            sizes: filters.sizes.clone(),
            colors: filters.colors.clone(),
            brands: filters.brands.clone(),
            in_stock: filters.in_stock,
            min_rating: filters.rating,
            include_inactive: params.include_inactive,
            sort_by: filters.sort_by,
            created_by: None,
        };

        let page = self
            .repository
            .list_all(params.page, params.limit, &store_filter)
            .await?;
        Ok(page.unwrap_or_else(ProductPage::empty))
    }

    // == Suggestions ==
    /// Up to five popular terms related to a query that found nothing. A
    /// term matches when either string contains the other.
    async fn generate_suggestions(&self, query: &str) -> Vec<String> {
        let query_lower = query.to_lowercase();
        self.popular_terms()
            .await
            .into_iter()
            .filter(|term| {
                let term_lower = term.to_lowercase();
                term_lower.contains(&query_lower) || query_lower.contains(&term_lower)
            })
            .take(MAX_SUGGESTIONS)
            .collect()
    }

    async fn popular_terms(&self) -> Vec<String> {
        if let Some(cached) = self.cache.get::<Vec<String>>(keys::search::POPULAR_TERMS).await {
            return cached;
        }

        let terms: Vec<String> = DEFAULT_POPULAR_TERMS.iter().map(|t| t.to_string()).collect();
        self.cache
            .set(keys::search::POPULAR_TERMS, &terms, Some(POPULAR_TERMS_TTL))
            .await;
        terms
    }

    // == Analytics ==
    /// Persists a short-lived record of this search and bumps the query's
    /// frequency counter. Purely best-effort: cache writes cannot fail the
    /// search, and a lost record only skews the summary.
    async fn record_analytics(&self, query: &str, result: &SearchResult, search_time_ms: u64) {
        let record = SearchRecord {
            query: query.to_string(),
            filters: result.filters.clone(),
            result_count: result.total,
            search_time_ms,
            timestamp: Utc::now(),
        };

        let key = keys::search::analytics(Utc::now().timestamp_micros());
        self.cache.set(&key, &record, Some(ANALYTICS_TTL)).await;

        if !query.is_empty() {
            let count = self.cache.increment(&keys::search::frequency(query), 1).await;
            debug!(query, count, "search frequency updated");
        }
    }

    /// Aggregates the retained analytics records from the last `days` days.
    pub async fn get_search_analytics(&self, days: u32) -> AnalyticsSummary {
        let cutoff = Utc::now() - Duration::days(days as i64);

        let mut total_searches = 0u64;
        let mut time_sum = 0u64;
        let mut no_result_queries = Vec::new();

        for key in self.cache.keys_matching(keys::search::ANALYTICS_PATTERN).await {
            let Some(record) = self.cache.get::<SearchRecord>(&key).await else {
                continue;
            };
            if record.timestamp < cutoff {
                continue;
            }
            total_searches += 1;
            time_sum += record.search_time_ms;
            if record.result_count == 0 && !record.query.is_empty() {
                no_result_queries.push(record.query);
            }
        }

        no_result_queries.sort();
        no_result_queries.dedup();

        let mut popular_queries = Vec::new();
        for key in self.cache.keys_matching(keys::search::FREQUENCY_PATTERN).await {
            let Some(count) = self.cache.get::<i64>(&key).await else {
                continue;
            };
            let query = key
                .strip_prefix(keys::search::FREQUENCY_PREFIX)
                .unwrap_or(&key)
                .to_string();
            popular_queries.push(QueryFrequency { query, count });
        }
        popular_queries.sort_by(|a, b| b.count.cmp(&a.count).then(a.query.cmp(&b.query)));
        popular_queries.truncate(TOP_QUERIES);

        AnalyticsSummary {
            total_searches,
            average_search_time_ms: if total_searches > 0 {
                time_sum / total_searches
            } else {
                0
            },
            popular_queries,
            no_result_queries,
        }
    }

    // == Autocomplete ==
    /// Name completions for a prefix of at least two characters. Shorter
    /// queries return empty immediately, with no cache lookup or backend
    /// call.
    pub async fn get_autocomplete_suggestions(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<String>> {
        let needle = query.trim().to_lowercase();
        if needle.chars().count() < 2 {
            return Ok(Vec::new());
        }

        let key = keys::search::autocomplete(&needle);
        if let Some(cached) = self.cache.get::<Vec<String>>(&key).await {
            return Ok(cached.into_iter().take(limit).collect());
        }

        // Oversized candidate fetch, then unique matching names.
        let filter = ProductFilter {
            name_query: Some(needle.clone()),
            ..ProductFilter::default()
        };
        let page = self
            .repository
            .list_all(1, (limit as u32).max(1) * 2, &filter)
            .await?
            .unwrap_or_else(ProductPage::empty);

        let mut suggestions: Vec<String> = Vec::new();
        for product in &page.products {
            if product.name.to_lowercase().contains(&needle)
                && !suggestions.contains(&product.name)
            {
                suggestions.push(product.name.clone());
            }
            if let Some(name_ar) = &product.name_ar {
                if name_ar.to_lowercase().contains(&needle) && !suggestions.contains(name_ar) {
                    suggestions.push(name_ar.clone());
                }
            }
        }
        suggestions.truncate(limit);

        self.cache.set(&key, &suggestions, Some(AUTOCOMPLETE_TTL)).await;
        Ok(suggestions)
    }

    // == Cache Management ==
    /// Drops all cached search state (results, analytics, counters, popular
    /// terms). Returns the number of entries removed.
    pub async fn clear_search_cache(&self) -> usize {
        self.cache.delete_pattern(keys::search::PATTERN).await
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::test_support::{new_product, CountingRepository};

    fn service(delegate: Arc<CountingRepository>) -> SearchService {
        SearchService::new(delegate, Cache::new(10_000, 300))
    }

    #[test]
    fn test_normalize_query_case_and_whitespace() {
        assert_eq!(normalize_query(" Shirt  "), "shirt");
        assert_eq!(normalize_query("blue   SHIRT"), "blue shirt");
        assert_eq!(normalize_query("shirt!!!"), "shirt");
        assert_eq!(normalize_query("قميص  أزرق"), "قميص أزرق");
        assert_eq!(normalize_query(""), "");
    }

    #[tokio::test]
    async fn test_equivalent_queries_share_cache_entry() {
        let delegate = Arc::new(CountingRepository::new());
        delegate.create(new_product("Shirt", "c1", "u1", 20.0)).await.unwrap();
        let svc = service(delegate.clone());

        let first = svc
            .search(" Shirt  ", &SearchFilters::default(), &SearchOptions::default())
            .await
            .unwrap();
        let second = svc
            .search("shirt", &SearchFilters::default(), &SearchOptions::default())
            .await
            .unwrap();

        assert_eq!(delegate.list_calls(), 1, "second query is a cache hit");
        assert_eq!(first.products, second.products);
        assert_eq!(first.total, second.total);
    }

    #[tokio::test]
    async fn test_pagination_metadata() {
        let delegate = Arc::new(CountingRepository::new());
        for i in 0..95 {
            delegate
                .create(new_product(&format!("Shirt {i}"), "c1", "u1", 20.0))
                .await
                .unwrap();
        }
        let svc = service(delegate);

        let options = SearchOptions {
            page: Some(3),
            limit: Some(20),
            ..SearchOptions::default()
        };
        let mid = svc
            .search("shirt", &SearchFilters::default(), &options)
            .await
            .unwrap();
        assert_eq!(mid.total, 95);
        assert_eq!(mid.total_pages, 5);
        assert!(mid.has_next_page);
        assert!(mid.has_prev_page);

        let options = SearchOptions {
            page: Some(5),
            limit: Some(20),
            ..SearchOptions::default()
        };
        let last = svc
            .search("shirt", &SearchFilters::default(), &options)
            .await
            .unwrap();
        assert_eq!(last.products.len(), 15);
        assert!(!last.has_next_page);
        assert!(last.has_prev_page);
    }

    #[tokio::test]
    async fn test_suggestions_for_empty_result() {
        let delegate = Arc::new(CountingRepository::new());
        let svc = service(delegate);

        let result = svc
            .search("shir", &SearchFilters::default(), &SearchOptions::default())
            .await
            .unwrap();

        assert_eq!(result.total, 0);
        let suggestions = result.suggestions.expect("suggestions populated");
        assert!(suggestions.contains(&"shirt".to_string()));
        assert!(suggestions.len() <= 5);
    }

    #[tokio::test]
    async fn test_no_suggestions_when_results_exist() {
        let delegate = Arc::new(CountingRepository::new());
        delegate.create(new_product("Shirt", "c1", "u1", 20.0)).await.unwrap();
        let svc = service(delegate);

        let result = svc
            .search("shirt", &SearchFilters::default(), &SearchOptions::default())
            .await
            .unwrap();

        assert_eq!(result.suggestions, None);
    }

    #[tokio::test]
    async fn test_empty_query_gets_no_suggestions() {
        let delegate = Arc::new(CountingRepository::new());
        let svc = service(delegate);

        let result = svc
            .search("   ", &SearchFilters::default(), &SearchOptions::default())
            .await
            .unwrap();

        assert_eq!(result.total, 0);
        assert_eq!(result.suggestions, None);
    }

    #[tokio::test]
    async fn test_empty_result_is_cached() {
        let delegate = Arc::new(CountingRepository::new());
        let svc = service(delegate.clone());

        for _ in 0..2 {
            let result = svc
                .search("boots", &SearchFilters::default(), &SearchOptions::default())
                .await
                .unwrap();
            assert_eq!(result.total, 0);
        }

        assert_eq!(delegate.list_calls(), 1, "empty results are cached");
    }

    #[tokio::test]
    async fn test_autocomplete_short_circuit() {
        let delegate = Arc::new(CountingRepository::new());
        let svc = service(delegate.clone());

        let suggestions = svc.get_autocomplete_suggestions("a", 10).await.unwrap();

        assert!(suggestions.is_empty());
        assert_eq!(delegate.list_calls(), 0, "short queries never reach the repository");
    }

    #[tokio::test]
    async fn test_autocomplete_unique_matching_names() {
        let delegate = Arc::new(CountingRepository::new());
        delegate.create(new_product("Blue Shirt", "c1", "u1", 20.0)).await.unwrap();
        delegate.create(new_product("Red Shirt", "c1", "u1", 25.0)).await.unwrap();
        delegate.create(new_product("Pants", "c1", "u1", 30.0)).await.unwrap();
        let svc = service(delegate.clone());

        let suggestions = svc.get_autocomplete_suggestions("shirt", 10).await.unwrap();

        assert_eq!(suggestions.len(), 2);
        assert!(suggestions.contains(&"Blue Shirt".to_string()));
        assert!(suggestions.contains(&"Red Shirt".to_string()));

        // Second lookup is served from cache.
        svc.get_autocomplete_suggestions("shirt", 10).await.unwrap();
        assert_eq!(delegate.list_calls(), 1);
    }

    #[tokio::test]
    async fn test_analytics_summary() {
        let delegate = Arc::new(CountingRepository::new());
        delegate.create(new_product("Shirt", "c1", "u1", 20.0)).await.unwrap();
        let svc = service(delegate);

        svc.search("shirt", &SearchFilters::default(), &SearchOptions::default())
            .await
            .unwrap();
        svc.search("nonexistent", &SearchFilters::default(), &SearchOptions::default())
            .await
            .unwrap();

        let summary = svc.get_search_analytics(7).await;

        assert_eq!(summary.total_searches, 2);
        assert_eq!(summary.no_result_queries, vec!["nonexistent".to_string()]);
        let queries: Vec<&str> = summary
            .popular_queries
            .iter()
            .map(|q| q.query.as_str())
            .collect();
        assert!(queries.contains(&"shirt"));
        assert!(queries.contains(&"nonexistent"));
    }

    #[tokio::test]
    async fn test_clear_search_cache_forces_requery() {
        let delegate = Arc::new(CountingRepository::new());
        delegate.create(new_product("Shirt", "c1", "u1", 20.0)).await.unwrap();
        let svc = service(delegate.clone());

        svc.search("shirt", &SearchFilters::default(), &SearchOptions::default())
            .await
            .unwrap();
        assert!(svc.clear_search_cache().await >= 1);
        svc.search("shirt", &SearchFilters::default(), &SearchOptions::default())
            .await
            .unwrap();

        assert_eq!(delegate.list_calls(), 2);
    }
}
