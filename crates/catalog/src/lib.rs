//! Product catalog domain module.
//!
//! This crate contains the product aggregate and its owned sub-entities
//! (options, option values, variants, images), the rules that keep it
//! consistent, and the persistence ports adapters implement. Pure domain
//! logic: no IO, no HTTP, no storage.

pub mod attribute;
pub mod category;
pub mod image;
pub mod option;
pub mod product;
pub mod repository;
pub mod validation;
pub mod variant;

pub use attribute::{Attribute, AttributeValue, validate_attribute_collection};
pub use category::Category;
pub use image::ProductImage;
pub use option::{OptionValue, ProductOption};
pub use product::Product;
pub use repository::{
    CategoryRepository, Page, ProductFilter, ProductPage, ProductRepository, ProductSort,
    RepositoryError,
};
pub use validation::validate_product_variant_structure;
pub use variant::ProductVariant;
