//! API Routes
//!
//! Configures the Axum router with all service endpoints.

use axum::{
    routing::{delete, get},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    autocomplete_handler, cache_stats_handler, category_products_handler, clear_cache_handler,
    clear_search_cache_handler, create_product_handler, delete_product_handler,
    get_product_handler, health_handler, invalidate_namespace_handler, list_products_handler,
    search_analytics_handler, search_handler, update_product_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /health` - Health check
/// - `GET /products` / `POST /products` - List and create products
/// - `GET|PUT|DELETE /products/:id` - Single product operations
/// - `GET /categories/:category_id/products` - Products in a category
/// - `GET /search` - Cached product search
/// - `GET /search/autocomplete` - Name completions
/// - `GET /search/analytics` - Search analytics summary
/// - `DELETE /search/cache` - Drop cached search state
/// - `GET /cache/stats` - Cache statistics snapshot
/// - `DELETE /cache` - Full cache clear
/// - `DELETE /cache/:namespace` - Bulk invalidation of one key namespace
///
/// # Middleware
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route(
            "/products",
            get(list_products_handler).post(create_product_handler),
        )
        .route(
            "/products/:id",
            get(get_product_handler)
                .put(update_product_handler)
                .delete(delete_product_handler),
        )
        .route(
            "/categories/:category_id/products",
            get(category_products_handler),
        )
        .route("/search", get(search_handler))
        .route("/search/autocomplete", get(autocomplete_handler))
        .route("/search/analytics", get(search_analytics_handler))
        .route("/search/cache", delete(clear_search_cache_handler))
        .route("/cache/stats", get(cache_stats_handler))
        .route("/cache", delete(clear_cache_handler))
        .route("/cache/:namespace", delete(invalidate_namespace_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
