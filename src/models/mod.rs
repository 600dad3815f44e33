//! Request and Response models for the service API
//!
//! DTOs for serializing/deserializing HTTP request and response bodies and
//! query strings.

pub mod requests;
pub mod responses;

pub use requests::{
    AnalyticsParams, AutocompleteParams, CreateProductRequest, ListProductsQuery,
    SearchQueryParams, UpdateProductRequest,
};
pub use responses::{
    CacheStatsResponse, HealthResponse, InvalidationResponse, MessageResponse,
    ProductListResponse,
};
