//! Persistence ports for the catalog.
//!
//! Implementations own durability, transactions and retries. They load and
//! store whole aggregates; the domain types never call them.

use thiserror::Error;

use storefront_core::{CategoryId, ProductId, SoftDelete};

use crate::category::Category;
use crate::product::Product;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("record not found")]
    NotFound,
    #[error("record already exists")]
    Duplicated,
    #[error("storage failure: {0}")]
    Storage(String),
}

/// Listing order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum ProductSort {
    /// Most recently created first (ids are time-ordered).
    #[default]
    Newest,
    PriceAsc,
    PriceDesc,
    Trending,
}

/// Listing filter. Empty fields match everything.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProductFilter {
    pub category_id: Option<CategoryId>,
    /// Case-insensitive substring of the product name.
    pub search: Option<String>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
    pub include_deleted: bool,
    pub sort: ProductSort,
}

impl ProductFilter {
    pub fn matches(&self, product: &Product) -> bool {
        if !self.include_deleted && product.is_removed() {
            return false;
        }
        if self.category_id.is_some_and(|id| id != product.category_id()) {
            return false;
        }
        if let Some(search) = self.search.as_deref().filter(|s| !s.is_empty()) {
            if !product.name().to_lowercase().contains(&search.to_lowercase()) {
                return false;
            }
        }
        if self.min_price.is_some_and(|min| product.price() < min) {
            return false;
        }
        if self.max_price.is_some_and(|max| product.price() > max) {
            return false;
        }
        true
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Page {
    pub offset: usize,
    pub limit: usize,
}

impl Page {
    pub fn new(offset: usize, limit: usize) -> Self {
        Self { offset, limit }
    }
}

/// One page of results plus the number of matches across all pages.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductPage {
    pub items: Vec<Product>,
    pub total: usize,
}

pub trait ProductRepository: Send + Sync {
    fn get(&self, id: ProductId) -> Result<Product, RepositoryError>;

    fn list(&self, filter: &ProductFilter, page: Page) -> Result<ProductPage, RepositoryError>;

    /// Persist a new product with its initial options, variants and images.
    fn create(&self, product: &Product) -> Result<(), RepositoryError>;

    /// Persist the current state of an existing product.
    fn update(&self, product: &Product) -> Result<(), RepositoryError>;

    fn soft_delete(&self, id: ProductId) -> Result<(), RepositoryError>;
}

pub trait CategoryRepository: Send + Sync {
    fn get(&self, id: CategoryId) -> Result<Category, RepositoryError>;

    fn list(&self) -> Result<Vec<Category>, RepositoryError>;

    fn create(&self, category: &Category) -> Result<(), RepositoryError>;

    fn update(&self, category: &Category) -> Result<(), RepositoryError>;
}
