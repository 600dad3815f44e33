//! Cached Product Repository
//!
//! Decorates any [`ProductRepository`] with cache-aside reads and write-path
//! invalidation. Callers stay cache-unaware: the wrapper implements the same
//! port as the delegate.
//!
//! TTLs are tiered by volatility: a single entity changes less often than
//! the filtered lists that aggregate many entities, so by-id reads live
//! longest and search results shortest. Correctness does not depend on the
//! tiering; every TTL is finite and every write invalidates the key families
//! that could hold stale data for the touched entity.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::cache::{keys, Cache};
use crate::catalog::{
    CounterField, NewProduct, Product, ProductFilter, ProductPage, ProductRepository,
    ProductUpdate,
};
use crate::error::Result;

// == TTL Tiers (seconds) ==
const TTL_PRODUCT_BY_ID: u64 = 30 * 60;
const TTL_PRODUCT_LIST: u64 = 10 * 60;
const TTL_SEARCH_RESULTS: u64 = 5 * 60;
const TTL_USER_PRODUCTS: u64 = 15 * 60;
const TTL_CATEGORY_PRODUCTS: u64 = 20 * 60;

/// Category listings are cached as a single wide page.
const CATEGORY_PAGE: u32 = 1;
const CATEGORY_PAGE_LIMIT: u32 = 100;

// == Cached Repository ==
pub struct CachedProductRepository {
    delegate: Arc<dyn ProductRepository>,
    cache: Cache,
}

impl CachedProductRepository {
    pub fn new(delegate: Arc<dyn ProductRepository>, cache: Cache) -> Self {
        Self { delegate, cache }
    }

    // == Search ==
    /// Cached name/category/owner search, served through the paged list
    /// query with the terms folded into a structured filter.
    pub async fn search(
        &self,
        name: &str,
        category_id: Option<&str>,
        created_by: Option<&str>,
        page: u32,
        limit: u32,
    ) -> Result<ProductPage> {
        let term = format!(
            "{}-{}-{}",
            name,
            category_id.unwrap_or_default(),
            created_by.unwrap_or_default()
        );
        let key = keys::product::search(&term, page, limit);

        self.cache
            .get_or_set(&key, TTL_SEARCH_RESULTS, || async {
                let filter = ProductFilter {
                    name_query: (!name.is_empty()).then(|| name.to_string()),
                    category_id: category_id.map(String::from),
                    created_by: created_by.map(String::from),
                    ..ProductFilter::default()
                };
                let result = self.delegate.list_all(page, limit, &filter).await?;
                Ok(result.unwrap_or_else(ProductPage::empty))
            })
            .await
    }

    // == Invalidation ==
    /// Drops every key family that could hold stale data for this product:
    /// its by-id key, the pages of its category and owner, and all list,
    /// search, and filter results. Each deleted key becomes independently
    /// correct; a reader between two deletes only sees a partially-cleared
    /// cache, never a wrong value.
    async fn invalidate_product(&self, product: &Product) {
        self.cache.delete(&keys::product::by_id(&product.id)).await;

        self.cache
            .delete_pattern(&keys::product::category_pattern(&product.category_id))
            .await;
        self.cache
            .delete_pattern(&keys::product::user_pattern(&product.created_by))
            .await;

        self.cache.delete_pattern(keys::product::ALL_PATTERN).await;
        self.cache.delete_pattern(keys::product::SEARCH_PATTERN).await;
        self.cache.delete_pattern(keys::product::FILTER_PATTERN).await;

        debug!(product_id = %product.id, "product caches invalidated");
    }

    // == Cache Management ==
    /// Drops the whole product namespace. Returns the number of entries
    /// removed.
    pub async fn clear_cache(&self) -> usize {
        let removed = self.cache.delete_pattern(keys::product::PATTERN).await;
        info!(removed, "product cache cleared");
        removed
    }

    /// Pre-populates the first list page so the first reader after startup
    /// hits the cache.
    pub async fn warm_cache(&self) {
        match self.list_all(1, 20, &ProductFilter::default()).await {
            Ok(_) => info!("product cache warmup completed"),
            Err(err) => info!(error = %err, "product cache warmup skipped"),
        }
    }
}

// == Repository Implementation ==
#[async_trait]
impl ProductRepository for CachedProductRepository {
    async fn find_by_id(&self, id: &str) -> Result<Option<Product>> {
        let key = keys::product::by_id(id);
        self.cache
            .get_or_set(&key, TTL_PRODUCT_BY_ID, || self.delegate.find_by_id(id))
            .await
    }

    async fn create(&self, input: NewProduct) -> Result<Product> {
        let product = self.delegate.create(input).await?;
        self.invalidate_product(&product).await;
        Ok(product)
    }

    async fn update(&self, id: &str, changes: ProductUpdate) -> Result<Option<Product>> {
        let updated = self.delegate.update(id, changes).await?;
        if let Some(product) = &updated {
            self.invalidate_product(product).await;
        }
        Ok(updated)
    }

    async fn delete(&self, id: &str) -> Result<()> {
        // Fetch before deleting so the category/owner patterns can still be
        // derived afterwards.
        let product = self.delegate.find_by_id(id).await?;

        self.delegate.delete(id).await?;

        if let Some(product) = &product {
            self.invalidate_product(product).await;
        }
        Ok(())
    }

    async fn list_all(
        &self,
        page: u32,
        limit: u32,
        filter: &ProductFilter,
    ) -> Result<Option<ProductPage>> {
        let key = keys::product::all(page, limit, &keys::filter_hash(filter));
        self.cache
            .get_or_set(&key, TTL_PRODUCT_LIST, || {
                self.delegate.list_all(page, limit, filter)
            })
            .await
    }

    async fn list_by_user(
        &self,
        page: u32,
        limit: u32,
        filter: &ProductFilter,
    ) -> Result<Option<ProductPage>> {
        let user_id = filter.created_by.as_deref().unwrap_or("unknown");
        let key = keys::product::by_user(user_id, page, limit);
        self.cache
            .get_or_set(&key, TTL_USER_PRODUCTS, || {
                self.delegate.list_by_user(page, limit, filter)
            })
            .await
    }

    async fn list_by_category(&self, category_id: &str) -> Result<Option<Vec<Product>>> {
        let key = keys::product::by_category(category_id, CATEGORY_PAGE, CATEGORY_PAGE_LIMIT);
        self.cache
            .get_or_set(&key, TTL_CATEGORY_PRODUCTS, || {
                self.delegate.list_by_category(category_id)
            })
            .await
    }

    async fn filter(&self, params: &ProductFilter) -> Result<Vec<Product>> {
        let key = keys::product::filtered(&keys::filter_hash(params));
        self.cache
            .get_or_set(&key, TTL_SEARCH_RESULTS, || self.delegate.filter(params))
            .await
    }

    async fn increment_counter(&self, id: &str, field: CounterField) -> Result<()> {
        self.delegate.increment_counter(id, field).await?;
        // Counters only change the entity itself; lists keep their ordering
        // until their own TTL elapses.
        self.cache.delete(&keys::product::by_id(id)).await;
        Ok(())
    }

    async fn decrement_counter(&self, id: &str, field: CounterField) -> Result<()> {
        self.delegate.decrement_counter(id, field).await?;
        self.cache.delete(&keys::product::by_id(id)).await;
        Ok(())
    }
}
