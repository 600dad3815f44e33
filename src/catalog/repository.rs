//! Product Repository Port
//!
//! Boundary trait between the caching layer and the persistent document
//! store. Implementations are the sole source of truth and must stay free of
//! caching concerns; the cached wrapper composes over this trait.

use async_trait::async_trait;

use crate::catalog::{CounterField, NewProduct, Product, ProductFilter, ProductPage, ProductUpdate};
use crate::error::Result;

// == Product Repository ==
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Looks up a single product by id.
    async fn find_by_id(&self, id: &str) -> Result<Option<Product>>;

    /// Persists a new product and returns the stored entity.
    async fn create(&self, input: NewProduct) -> Result<Product>;

    /// Applies a partial update; returns the updated entity, or None if the
    /// id does not exist.
    async fn update(&self, id: &str, changes: ProductUpdate) -> Result<Option<Product>>;

    /// Removes a product. Deleting an absent id is not an error.
    async fn delete(&self, id: &str) -> Result<()>;

    /// One page of products matching the filter, newest first unless the
    /// filter says otherwise, plus the filtered total.
    async fn list_all(&self, page: u32, limit: u32, filter: &ProductFilter)
        -> Result<Option<ProductPage>>;

    /// One page of products owned by the user named in the filter.
    async fn list_by_user(&self, page: u32, limit: u32, filter: &ProductFilter)
        -> Result<Option<ProductPage>>;

    /// All products in a category.
    async fn list_by_category(&self, category_id: &str) -> Result<Option<Vec<Product>>>;

    /// Unpaged structured filter query.
    async fn filter(&self, params: &ProductFilter) -> Result<Vec<Product>>;

    /// Increments a denormalized counter field.
    async fn increment_counter(&self, id: &str, field: CounterField) -> Result<()>;

    /// Decrements a denormalized counter field (floored at zero).
    async fn decrement_counter(&self, id: &str, field: CounterField) -> Result<()>;
}
