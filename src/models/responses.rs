//! Response DTOs for the service API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::cache::CacheStats;
use crate::catalog::{Product, ProductPage};

// == Message Response ==
/// Generic acknowledgement body.
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// == Product List Response ==
#[derive(Debug, Clone, Serialize)]
pub struct ProductListResponse {
    pub products: Vec<Product>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
}

impl ProductListResponse {
    pub fn new(page_data: ProductPage, page: u32, limit: u32) -> Self {
        Self {
            products: page_data.products,
            total: page_data.total,
            page,
            limit,
        }
    }
}

// == Invalidation Response ==
/// Result of a bulk cache invalidation.
#[derive(Debug, Clone, Serialize)]
pub struct InvalidationResponse {
    pub message: String,
    pub removed: usize,
}

impl InvalidationResponse {
    pub fn new(message: impl Into<String>, removed: usize) -> Self {
        Self {
            message: message.into(),
            removed,
        }
    }
}

// == Cache Stats Response ==
/// Operational snapshot of the cache store.
#[derive(Debug, Clone, Serialize)]
pub struct CacheStatsResponse {
    pub size: usize,
    pub max_entries: usize,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub expired_removals: u64,
    pub hit_rate: f64,
}

impl CacheStatsResponse {
    pub fn new(stats: CacheStats, max_entries: usize) -> Self {
        Self {
            size: stats.total_entries,
            max_entries,
            hits: stats.hits,
            misses: stats.misses,
            evictions: stats.evictions,
            expired_removals: stats.expired_removals,
            hit_rate: stats.hit_rate(),
        }
    }
}

// == Health Response ==
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
