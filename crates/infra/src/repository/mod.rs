//! Repository adapters for the catalog ports.

pub mod in_memory;

pub use in_memory::{InMemoryCategoryRepository, InMemoryProductRepository, InMemoryStore};
