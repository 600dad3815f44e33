//! In-Memory Product Repository
//!
//! Reference implementation of the repository port over a process-local map,
//! standing in for the document store. Filter evaluation mirrors the store
//! queries the filter type describes: bilingual substring search, range and
//! membership predicates, and the recognized sort orders.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::catalog::{
    CounterField, NewProduct, Product, ProductFilter, ProductPage, ProductRepository,
    ProductUpdate, SortBy,
};
use crate::error::Result;

// == In-Memory Repository ==
#[derive(Default)]
pub struct InMemoryProductRepository {
    products: RwLock<HashMap<String, Product>>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn matching(&self, products: &HashMap<String, Product>, filter: &ProductFilter) -> Vec<Product> {
        let mut matched: Vec<Product> = products
            .values()
            .filter(|p| product_matches(p, filter))
            .cloned()
            .collect();
        sort_products(&mut matched, filter.sort_by);
        matched
    }
}

// == Filter Evaluation ==
fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn product_matches(product: &Product, filter: &ProductFilter) -> bool {
    if !filter.include_inactive && !product.is_active {
        return false;
    }
    if let Some(category_id) = &filter.category_id {
        if &product.category_id != category_id {
            return false;
        }
    }
    if let Some(created_by) = &filter.created_by {
        if &product.created_by != created_by {
            return false;
        }
    }
    if let Some(query) = &filter.name_query {
        let hit = contains_ci(&product.name, query)
            || product.name_ar.as_deref().is_some_and(|n| contains_ci(n, query))
            || product.description.as_deref().is_some_and(|d| contains_ci(d, query))
            || product
                .description_ar
                .as_deref()
                .is_some_and(|d| contains_ci(d, query))
            || product.brand.as_deref().is_some_and(|b| contains_ci(b, query));
        if !hit {
            return false;
        }
    }
    if let Some(min_price) = filter.min_price {
        if product.price < min_price {
            return false;
        }
    }
    if let Some(max_price) = filter.max_price {
        if product.price > max_price {
            return false;
        }
    }
    if !filter.sizes.is_empty() && !filter.sizes.iter().any(|s| product.sizes.contains(s)) {
        return false;
    }
    if !filter.colors.is_empty() && !filter.colors.iter().any(|c| product.colors.contains(c)) {
        return false;
    }
    if !filter.brands.is_empty()
        && !product
            .brand
            .as_ref()
            .is_some_and(|b| filter.brands.contains(b))
    {
        return false;
    }
    if filter.in_stock == Some(true) && product.stock <= 0 {
        return false;
    }
    if let Some(min_rating) = filter.min_rating {
        if product.rating < min_rating {
            return false;
        }
    }
    true
}

fn sort_products(products: &mut [Product], sort_by: Option<SortBy>) {
    match sort_by.unwrap_or(SortBy::Newest) {
        SortBy::Newest => products.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        SortBy::Oldest => products.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
        SortBy::PriceAsc => products.sort_by(|a, b| a.price.total_cmp(&b.price)),
        SortBy::PriceDesc => products.sort_by(|a, b| b.price.total_cmp(&a.price)),
        SortBy::Rating => products.sort_by(|a, b| b.rating.total_cmp(&a.rating)),
        SortBy::Popularity => products.sort_by(|a, b| b.views_count.cmp(&a.views_count)),
    }
}

fn page_of(mut matched: Vec<Product>, page: u32, limit: u32) -> ProductPage {
    let total = matched.len() as u64;
    let start = ((page.max(1) - 1) as usize) * limit as usize;
    let products = if start >= matched.len() {
        Vec::new()
    } else {
        matched.drain(start..).take(limit as usize).collect()
    };
    ProductPage { products, total }
}

// == Repository Implementation ==
#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn find_by_id(&self, id: &str) -> Result<Option<Product>> {
        Ok(self.products.read().await.get(id).cloned())
    }

    async fn create(&self, input: NewProduct) -> Result<Product> {
        let product = input.into_product(Uuid::new_v4().to_string(), Utc::now());
        self.products
            .write()
            .await
            .insert(product.id.clone(), product.clone());
        Ok(product)
    }

    async fn update(&self, id: &str, changes: ProductUpdate) -> Result<Option<Product>> {
        let mut products = self.products.write().await;
        match products.get_mut(id) {
            Some(product) => {
                changes.apply(product);
                product.updated_at = Utc::now();
                Ok(Some(product.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.products.write().await.remove(id);
        Ok(())
    }

    async fn list_all(
        &self,
        page: u32,
        limit: u32,
        filter: &ProductFilter,
    ) -> Result<Option<ProductPage>> {
        let products = self.products.read().await;
        let matched = self.matching(&products, filter);
        Ok(Some(page_of(matched, page, limit)))
    }

    async fn list_by_user(
        &self,
        page: u32,
        limit: u32,
        filter: &ProductFilter,
    ) -> Result<Option<ProductPage>> {
        self.list_all(page, limit, filter).await
    }

    async fn list_by_category(&self, category_id: &str) -> Result<Option<Vec<Product>>> {
        let products = self.products.read().await;
        let matched = self.matching(&products, &ProductFilter::for_category(category_id));
        Ok(Some(matched))
    }

    async fn filter(&self, params: &ProductFilter) -> Result<Vec<Product>> {
        let products = self.products.read().await;
        Ok(self.matching(&products, params))
    }

    async fn increment_counter(&self, id: &str, field: CounterField) -> Result<()> {
        let mut products = self.products.write().await;
        if let Some(product) = products.get_mut(id) {
            match field {
                CounterField::Favorites => product.favorites_count += 1,
                CounterField::Views => product.views_count += 1,
                CounterField::Reviews => product.reviews_count += 1,
            }
        }
        Ok(())
    }

    async fn decrement_counter(&self, id: &str, field: CounterField) -> Result<()> {
        let mut products = self.products.write().await;
        if let Some(product) = products.get_mut(id) {
            let counter = match field {
                CounterField::Favorites => &mut product.favorites_count,
                CounterField::Views => &mut product.views_count,
                CounterField::Reviews => &mut product.reviews_count,
            };
            *counter = (*counter - 1).max(0);
        }
        Ok(())
    }
}
