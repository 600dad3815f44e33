//! Product Domain Types
//!
//! The product entity and the structured value objects that travel through
//! the repository boundary: creation/update partials, the store-query filter,
//! and pagination results. Names are bilingual (Latin plus Arabic script)
//! because search matches against both variants.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// == Product ==
/// A catalog product.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub name_ar: Option<String>,
    pub description: Option<String>,
    pub description_ar: Option<String>,
    pub price: f64,
    pub images: Vec<String>,
    pub sizes: Vec<String>,
    pub colors: Vec<String>,
    pub stock: i64,
    pub brand: Option<String>,
    pub rating: f64,
    pub reviews_count: i64,
    pub favorites_count: i64,
    pub views_count: i64,
    pub category_id: String,
    pub created_by: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// == New Product ==
/// Fields required to create a product; counters and timestamps are owned by
/// the repository.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProduct {
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

impl NewProduct {
    /// Materializes the entity with repository-assigned id and timestamps.
    pub fn into_product(self, id: String, now: DateTime<Utc>) -> Product {
        Product {
            id,
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
            rating: 0.0,
            reviews_count: 0,
            favorites_count: 0,
            views_count: 0,
            category_id: self.category_id,
            created_by: self.created_by,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }
}

// == Product Update ==
/// Partial update; absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductUpdate {
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

impl ProductUpdate {
    /// Applies the present fields onto an existing product.
    pub fn apply(&self, product: &mut Product) {
        if let Some(name) = &self.name {
            product.name = name.clone();
        }
        if let Some(name_ar) = &self.name_ar {
            product.name_ar = Some(name_ar.clone());
        }
        if let Some(description) = &self.description {
            product.description = Some(description.clone());
        }
        if let Some(description_ar) = &self.description_ar {
            product.description_ar = Some(description_ar.clone());
        }
        if let Some(price) = self.price {
            product.price = price;
        }
        if let Some(images) = &self.images {
            product.images = images.clone();
        }
        if let Some(sizes) = &self.sizes {
            product.sizes = sizes.clone();
        }
        if let Some(colors) = &self.colors {
            product.colors = colors.clone();
        }
        if let Some(stock) = self.stock {
            product.stock = stock;
        }
        if let Some(brand) = &self.brand {
            product.brand = Some(brand.clone());
        }
        if let Some(category_id) = &self.category_id {
            product.category_id = category_id.clone();
        }
        if let Some(is_active) = self.is_active {
            product.is_active = is_active;
        }
    }
}

// == Product Page ==
/// One page of results plus the total size of the filtered set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductPage {
    pub products: Vec<Product>,
    pub total: u64,
}

impl ProductPage {
    pub fn empty() -> Self {
        Self {
            products: Vec::new(),
            total: 0,
        }
    }
}

// == Sort Order ==
/// Recognized sort orders for product listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortBy {
    Newest,
    Oldest,
    PriceAsc,
    PriceDesc,
    Rating,
    Popularity,
}

impl SortBy {
    /// Parses a client-supplied sort value. Unrecognized values yield None
    /// rather than an error; unknown sorts fall back to no explicit sort.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "newest" => Some(Self::Newest),
            "oldest" => Some(Self::Oldest),
            "priceAsc" => Some(Self::PriceAsc),
            "priceDesc" => Some(Self::PriceDesc),
            "rating" => Some(Self::Rating),
            "popularity" => Some(Self::Popularity),
            _ => None,
        }
    }
}

// == Counter Field ==
/// Denormalized counters maintained on the product document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterField {
    Favorites,
    Views,
    Reviews,
}

impl CounterField {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Favorites => "favorites_count",
            Self::Views => "views_count",
            Self::Reviews => "reviews_count",
        }
    }
}

// == Product Filter ==
/// Structured store-query form consumed by repositories.
///
/// Explicit optional fields instead of an open-ended bag of keys; this type
/// is also the canonicalization input for list cache keys, so absent fields
/// are skipped during serialization to keep logically equal filters on the
/// same key.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProductFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    /// Case-insensitive substring match across name, name_ar, description,
    /// description_ar, and brand.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_query: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_price: Option<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sizes: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub colors: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub brands: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub in_stock: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_rating: Option<f64>,
    /// Inactive products are excluded unless set.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub include_inactive: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<SortBy>,
}

impl ProductFilter {
    /// Filter matching a single category, as used by category listings.
    pub fn for_category(category_id: &str) -> Self {
        Self {
            category_id: Some(category_id.to_string()),
            ..Self::default()
        }
    }

    /// Filter matching a single owner.
    pub fn for_user(user_id: &str) -> Self {
        Self {
            created_by: Some(user_id.to_string()),
            ..Self::default()
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_by_parse_known_values() {
        assert_eq!(SortBy::parse("newest"), Some(SortBy::Newest));
        assert_eq!(SortBy::parse("priceAsc"), Some(SortBy::PriceAsc));
        assert_eq!(SortBy::parse("popularity"), Some(SortBy::Popularity));
    }

    #[test]
    fn test_sort_by_parse_unknown_is_silent() {
        assert_eq!(SortBy::parse("alphabetical"), None);
        assert_eq!(SortBy::parse(""), None);
    }

    #[test]
    fn test_update_apply_partial() {
        let new = NewProduct {
            name: "Shirt".to_string(),
            name_ar: None,
            description: None,
            description_ar: None,
            price: 20.0,
            images: vec![],
            sizes: vec!["m".to_string()],
            colors: vec![],
            stock: 5,
            brand: None,
            category_id: "c1".to_string(),
            created_by: "u1".to_string(),
        };
        let mut product = new.into_product("p1".to_string(), Utc::now());

        let update = ProductUpdate {
            price: Some(15.0),
            stock: Some(0),
            ..ProductUpdate::default()
        };
        update.apply(&mut product);

        assert_eq!(product.price, 15.0);
        assert_eq!(product.stock, 0);
        assert_eq!(product.name, "Shirt");
        assert_eq!(product.sizes, vec!["m".to_string()]);
    }

    #[test]
    fn test_filter_serialization_skips_absent_fields() {
        let filter = ProductFilter::for_category("c1");
        let json = serde_json::to_string(&filter).expect("serialize");

        assert_eq!(json, r#"{"category_id":"c1"}"#);
    }

    #[test]
    fn test_default_filter_serializes_empty() {
        let filter = ProductFilter::default();
        let json = serde_json::to_string(&filter).expect("serialize");

        assert_eq!(json, "{}");
    }
}
