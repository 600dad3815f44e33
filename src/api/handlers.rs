//! API Handlers
//!
//! HTTP request handlers for the catalog, search, and cache-admin endpoints.
//! Handlers stay thin: translate the DTO, call the cached repository or the
//! search service, map absent entities to 404.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::cache::Cache;
use crate::catalog::{
    CachedProductRepository, InMemoryProductRepository, Product, ProductRepository,
};
use crate::config::Config;
use crate::error::{AppError, Result};
use crate::models::{
    AnalyticsParams, AutocompleteParams, CacheStatsResponse, CreateProductRequest,
    HealthResponse, InvalidationResponse, ListProductsQuery, MessageResponse,
    ProductListResponse, SearchQueryParams, UpdateProductRequest,
};
use crate::search::{AnalyticsSummary, SearchResult, SearchService};

// == App State ==
/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Shared cache handle, also used directly by the admin endpoints
    pub cache: Cache,
    /// Cache-aware product repository
    pub catalog: Arc<CachedProductRepository>,
    /// Search orchestrator
    pub search: Arc<SearchService>,
}

impl AppState {
    /// Wires the cached repository and search service over a delegate
    /// repository and a cache handle.
    pub fn new(cache: Cache, delegate: Arc<dyn ProductRepository>) -> Self {
        let catalog = Arc::new(CachedProductRepository::new(delegate, cache.clone()));
        let search = Arc::new(SearchService::new(
            catalog.clone() as Arc<dyn ProductRepository>,
            cache.clone(),
        ));
        Self {
            cache,
            catalog,
            search,
        }
    }

    /// Creates state from configuration, backed by the in-memory store.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            Cache::new(config.max_entries, config.default_ttl),
            Arc::new(InMemoryProductRepository::new()),
        )
    }
}

// == Health ==
/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

// == Products ==
/// Handler for GET /products/:id
pub async fn get_product_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Product>> {
    let product = state
        .catalog
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Product not found: {id}")))?;

    Ok(Json(product))
}

/// Handler for POST /products
pub async fn create_product_handler(
    State(state): State<AppState>,
    Json(request): Json<CreateProductRequest>,
) -> Result<Json<Product>> {
    if let Some(message) = request.validate() {
        return Err(AppError::InvalidRequest(message));
    }

    let product = state.catalog.create(request.into_new_product()).await?;
    Ok(Json(product))
}

/// Handler for PUT /products/:id
pub async fn update_product_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateProductRequest>,
) -> Result<Json<Product>> {
    if let Some(message) = request.validate() {
        return Err(AppError::InvalidRequest(message));
    }

    let product = state
        .catalog
        .update(&id, request.into_update())
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Product not found: {id}")))?;

    Ok(Json(product))
}

/// Handler for DELETE /products/:id
pub async fn delete_product_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>> {
    state.catalog.delete(&id).await?;
    Ok(Json(MessageResponse::new(format!(
        "Product '{id}' deleted"
    ))))
}

/// Handler for GET /products
pub async fn list_products_handler(
    State(state): State<AppState>,
    Query(query): Query<ListProductsQuery>,
) -> Result<Json<ProductListResponse>> {
    let page = query.page();
    let limit = query.limit();
    let filter = query.into_filter();

    let page_data = state
        .catalog
        .list_all(page, limit, &filter)
        .await?
        .unwrap_or_else(crate::catalog::ProductPage::empty);

    Ok(Json(ProductListResponse::new(page_data, page, limit)))
}

/// Handler for GET /categories/:category_id/products
pub async fn category_products_handler(
    State(state): State<AppState>,
    Path(category_id): Path<String>,
) -> Result<Json<Vec<Product>>> {
    let products = state
        .catalog
        .list_by_category(&category_id)
        .await?
        .unwrap_or_default();

    Ok(Json(products))
}

// == Search ==
/// Handler for GET /search
pub async fn search_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchQueryParams>,
) -> Result<Json<SearchResult>> {
    let result = state
        .search
        .search(params.query(), &params.filters(), &params.options())
        .await?;

    Ok(Json(result))
}

/// Handler for GET /search/autocomplete
pub async fn autocomplete_handler(
    State(state): State<AppState>,
    Query(params): Query<AutocompleteParams>,
) -> Result<Json<Vec<String>>> {
    let suggestions = state
        .search
        .get_autocomplete_suggestions(params.q.as_deref().unwrap_or(""), params.limit())
        .await?;

    Ok(Json(suggestions))
}

/// Handler for GET /search/analytics
pub async fn search_analytics_handler(
    State(state): State<AppState>,
    Query(params): Query<AnalyticsParams>,
) -> Json<AnalyticsSummary> {
    Json(state.search.get_search_analytics(params.days()).await)
}

/// Handler for DELETE /search/cache
pub async fn clear_search_cache_handler(
    State(state): State<AppState>,
) -> Json<InvalidationResponse> {
    let removed = state.search.clear_search_cache().await;
    Json(InvalidationResponse::new("Search cache cleared", removed))
}

// == Cache Admin ==
/// Handler for GET /cache/stats
pub async fn cache_stats_handler(State(state): State<AppState>) -> Json<CacheStatsResponse> {
    let stats = state.cache.stats().await;
    let max_entries = state.cache.max_entries().await;
    Json(CacheStatsResponse::new(stats, max_entries))
}

/// Handler for DELETE /cache
pub async fn clear_cache_handler(State(state): State<AppState>) -> Json<MessageResponse> {
    state.cache.clear().await;
    Json(MessageResponse::new("Cache cleared"))
}

/// Handler for DELETE /cache/:namespace
///
/// Bulk invalidation of one key namespace (`product`, `search`,
/// `autocomplete`, ...).
pub async fn invalidate_namespace_handler(
    State(state): State<AppState>,
    Path(namespace): Path<String>,
) -> Result<Json<InvalidationResponse>> {
    let namespace = namespace.trim().to_string();
    if namespace.is_empty() || namespace.contains(['*', ':']) {
        return Err(AppError::InvalidRequest(format!(
            "Invalid cache namespace: {namespace}"
        )));
    }

    let removed = if namespace == "product" {
        state.catalog.clear_cache().await
    } else {
        state
            .cache
            .delete_pattern(&crate::cache::keys::namespace_pattern(&namespace))
            .await
    };

    Ok(Json(InvalidationResponse::new(
        format!("Cache namespace '{namespace}' cleared"),
        removed,
    )))
}
