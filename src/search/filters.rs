//! Search Filters Module
//!
//! Value objects for the search entry points and their validation and
//! normalization rules. Invalid input is corrected rather than rejected:
//! prices are swapped into order, ratings clamped, unknown sorts dropped,
//! and pagination forced into range.

use serde::{Deserialize, Serialize};

use crate::catalog::{Product, SortBy};

/// Hard ceiling on page size.
const MAX_LIMIT: u32 = 100;
const DEFAULT_LIMIT: u32 = 20;

// == Search Filters ==
/// Structured search refinements. Absent fields are skipped during
/// serialization so the canonical cache key only reflects what was asked.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SearchFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_price: Option<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sizes: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub colors: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub brands: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub in_stock: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<SortBy>,
}

impl SearchFilters {
    // == Validate ==
    /// Produces the corrected filter set:
    /// - negative price bounds are dropped, and min/max swapped into order
    /// - rating clamped to [0, 5]
    /// - array values trimmed and emptied of blanks
    /// - category trimmed (blank means no category filter)
    ///
    /// Unknown sort values never reach this type; they are dropped to None
    /// at the parse edge ([`SortBy::parse`]).
    pub fn validate(&self) -> SearchFilters {
        let mut validated = SearchFilters {
            category: self
                .category
                .as_deref()
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(String::from),
            min_price: self.min_price.filter(|p| *p >= 0.0),
            max_price: self.max_price.filter(|p| *p >= 0.0),
            sizes: clean_terms(&self.sizes),
            colors: clean_terms(&self.colors),
            brands: clean_terms(&self.brands),
            in_stock: self.in_stock,
            rating: self.rating.map(|r| r.clamp(0.0, 5.0)),
            sort_by: self.sort_by,
        };

        if let (Some(min), Some(max)) = (validated.min_price, validated.max_price) {
            if min > max {
                validated.min_price = Some(max);
                validated.max_price = Some(min);
            }
        }

        validated
    }
}

fn clean_terms(values: &[String]) -> Vec<String> {
    values
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(String::from)
        .collect()
}

// == Search Options ==
/// Pagination and mode flags as received from the caller.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchOptions {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub include_inactive: Option<bool>,
    pub fuzzy_search: Option<bool>,
}

impl SearchOptions {
    // == Normalize ==
    /// Forces pagination into range: `page >= 1`, `limit` within
    /// `[1, 100]`; mode flags default to false.
    pub fn normalize(&self) -> SearchParams {
        SearchParams {
            page: self.page.unwrap_or(1).max(1),
            limit: self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT),
            include_inactive: self.include_inactive.unwrap_or(false),
            fuzzy_search: self.fuzzy_search.unwrap_or(false),
        }
    }
}

/// Normalized options; every field has a definite value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchParams {
    pub page: u32,
    pub limit: u32,
    pub include_inactive: bool,
    pub fuzzy_search: bool,
}

// == Search Result ==
/// Composed search response. `search_time_ms` always reflects the serving
/// call's wall clock, cache hit or not; `suggestions` is populated only when
/// the result set is empty and the query was non-empty.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchResult {
    pub products: Vec<Product>,
    pub total: u64,
    pub page: u32,
    pub total_pages: u32,
    pub has_next_page: bool,
    pub has_prev_page: bool,
    pub filters: SearchFilters,
    pub search_time_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestions: Option<Vec<String>>,
}

// == Pagination Math ==
/// `ceil(total / limit)`; zero items means zero pages.
pub fn total_pages(total: u64, limit: u32) -> u32 {
    total.div_ceil(limit.max(1) as u64) as u32
}
