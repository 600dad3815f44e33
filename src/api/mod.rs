//! API Module
//!
//! HTTP handlers and routing for the service REST API: product CRUD and
//! listing, search entry points, and cache-admin operations.

pub mod handlers;
pub mod routes;

pub use handlers::AppState;
pub use routes::create_router;
