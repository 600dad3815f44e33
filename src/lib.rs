//! Shopcache - In-memory product cache and search layer
//!
//! Cache-aside reads and write-path invalidation over a product repository,
//! backed by a TTL key-value store with capacity-bounded eviction, plus a
//! normalized cached search service.

pub mod api;
pub mod cache;
pub mod catalog;
pub mod config;
pub mod error;
pub mod models;
pub mod search;
pub mod tasks;

pub use api::AppState;
pub use cache::Cache;
pub use config::Config;
pub use tasks::spawn_sweep_task;
