//! Request DTOs for the service API
//!
//! Defines the structure of incoming HTTP request bodies and query strings,
//! and their translation into domain types. List-valued query parameters
//! arrive comma-separated; sort values are parsed leniently, with unknown
//! sorts falling back to no explicit sort.

use serde::Deserialize;

use crate::catalog::{NewProduct, ProductFilter, ProductUpdate, SortBy};
use crate::search::{SearchFilters, SearchOptions};

// == Create Product ==
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    #[serde(default)]
    pub name_ar: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub description_ar: Option<String>,
    pub price: f64,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub sizes: Vec<String>,
    #[serde(default)]
    pub colors: Vec<String>,
    #[serde(default)]
    pub stock: i64,
    #[serde(default)]
    pub brand: Option<String>,
    pub category_id: String,
    pub created_by: String,
}

impl CreateProductRequest {
    /// Returns an error message if the request is invalid, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.name.trim().is_empty() {
            return Some("Product name cannot be empty".to_string());
        }
        if self.price < 0.0 {
            return Some("Price cannot be negative".to_string());
        }
        if self.category_id.trim().is_empty() {
            return Some("Category id cannot be empty".to_string());
        }
        if self.created_by.trim().is_empty() {
            return Some("Creator id cannot be empty".to_string());
        }
        None
    }

    pub fn into_new_product(self) -> NewProduct {
        NewProduct {
            name: self.name,
            name_ar: self.name_ar,
            description: self.description,
            description_ar: self.description_ar,
            price: self.price,
            images: self.images,
            sizes: self.sizes,
            colors: self.colors,
            stock: self.stock,
            brand: self.brand,
            category_id: self.category_id,
            created_by: self.created_by,
        }
    }
}

// == Update Product ==
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub name_ar: Option<String>,
    pub description: Option<String>,
    pub description_ar: Option<String>,
    pub price: Option<f64>,
    pub images: Option<Vec<String>>,
    pub sizes: Option<Vec<String>>,
    pub colors: Option<Vec<String>>,
    pub stock: Option<i64>,
    pub brand: Option<String>,
    pub category_id: Option<String>,
    pub is_active: Option<bool>,
}

impl UpdateProductRequest {
    pub fn validate(&self) -> Option<String> {
        if let Some(price) = self.price {
            if price < 0.0 {
                return Some("Price cannot be negative".to_string());
            }
        }
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Some("Product name cannot be empty".to_string());
            }
        }
        None
    }

    pub fn into_update(self) -> ProductUpdate {
        ProductUpdate {
            name: self.name,
            name_ar: self.name_ar,
            description: self.description,
            description_ar: self.description_ar,
            price: self.price,
            images: self.images,
            sizes: self.sizes,
            colors: self.colors,
            stock: self.stock,
            brand: self.brand,
            category_id: self.category_id,
            is_active: self.is_active,
        }
    }
}

// == List Products ==
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ListProductsQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub category_id: Option<String>,
    pub created_by: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub in_stock: Option<bool>,
    pub sort_by: Option<String>,
}

impl ListProductsQuery {
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn limit(&self) -> u32 {
        self.limit.unwrap_or(20).clamp(1, 100)
    }

    pub fn into_filter(self) -> ProductFilter {
        ProductFilter {
            category_id: self.category_id,
            created_by: self.created_by,
            min_price: self.min_price,
            max_price: self.max_price,
            in_stock: self.in_stock,
            sort_by: self.sort_by.as_deref().and_then(SortBy::parse),
            ..ProductFilter::default()
        }
    }
}

// == Search ==
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SearchQueryParams {
    pub q: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub category: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    /// Comma-separated list
    pub sizes: Option<String>,
    /// Comma-separated list
    pub colors: Option<String>,
    /// Comma-separated list
    pub brands: Option<String>,
    pub in_stock: Option<bool>,
    pub rating: Option<f64>,
    pub sort_by: Option<String>,
    pub include_inactive: Option<bool>,
    pub fuzzy_search: Option<bool>,
}

impl SearchQueryParams {
    pub fn query(&self) -> &str {
        self.q.as_deref().unwrap_or("")
    }

    pub fn filters(&self) -> SearchFilters {
        SearchFilters {
            category: self.category.clone(),
            min_price: self.min_price,
            max_price: self.max_price,
            sizes: split_csv(self.sizes.as_deref()),
            colors: split_csv(self.colors.as_deref()),
            brands: split_csv(self.brands.as_deref()),
            in_stock: self.in_stock,
            rating: self.rating,
            sort_by: self.sort_by.as_deref().and_then(SortBy::parse),
        }
    }

    pub fn options(&self) -> SearchOptions {
        SearchOptions {
            page: self.page,
            limit: self.limit,
            include_inactive: self.include_inactive,
            fuzzy_search: self.fuzzy_search,
        }
    }
}

fn split_csv(value: Option<&str>) -> Vec<String> {
    value
        .map(|v| {
            v.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}

// == Autocomplete ==
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AutocompleteParams {
    pub q: Option<String>,
    pub limit: Option<usize>,
}

impl AutocompleteParams {
    pub fn limit(&self) -> usize {
        self.limit.unwrap_or(10).clamp(1, 50)
    }
}

// == Analytics ==
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AnalyticsParams {
    pub days: Option<u32>,
}

impl AnalyticsParams {
    pub fn days(&self) -> u32 {
        self.days.unwrap_or(7).max(1)
    }
}
