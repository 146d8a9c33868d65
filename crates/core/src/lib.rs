//! `storefront-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod aggregate;
pub mod entity;
pub mod error;
pub mod id;
pub mod validation;

pub use aggregate::AggregateRoot;
pub use entity::{Entity, SoftDelete};
pub use error::{DomainError, DomainResult};
pub use id::{
    AttributeId, AttributeValueId, CategoryId, ImageId, OptionId, OptionValueId, ProductId,
    VariantId,
};
pub use validation::{Validate, ValidationErrors, Validator, Violation, ViolationKind};
