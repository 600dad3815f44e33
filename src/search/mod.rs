//! Search Module
//!
//! Query normalization, filter validation, cached search execution,
//! suggestions, autocomplete, and search analytics.

mod filters;
mod service;

pub use filters::{SearchFilters, SearchOptions, SearchParams, SearchResult};
pub use service::{
    normalize_query, AnalyticsSummary, QueryFrequency, SearchRecord, SearchService,
};
