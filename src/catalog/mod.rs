//! Catalog Module
//!
//! Product domain types, the repository port to the document store, the
//! in-memory reference implementation, and the cached repository wrapper.

mod cached;
mod memory;
mod product;
mod repository;

pub use cached::CachedProductRepository;
pub use memory::InMemoryProductRepository;
pub use product::{
    CounterField, NewProduct, Product, ProductFilter, ProductPage, ProductUpdate, SortBy,
};
pub use repository::ProductRepository;
