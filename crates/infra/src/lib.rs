//! Infrastructure layer: configuration, repository adapters and the catalog
//! application service.

pub mod config;
pub mod repository;
pub mod service;

pub use config::CatalogConfig;
pub use repository::{InMemoryCategoryRepository, InMemoryProductRepository};
pub use service::{
    CatalogError, CatalogResult, CatalogService, CreateProduct, NewOption, NewVariant,
    OptionSelection, UpdateProduct,
};
