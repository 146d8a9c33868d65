//! Configuration loading and representation.

use storefront_catalog::Page;
use storefront_core::{ImageId, ProductId};

const DEFAULT_IMAGE_BASE_URL: &str = "http://localhost:9000/catalog";
const DEFAULT_PAGE_SIZE: usize = 20;
const DEFAULT_MAX_PAGE_SIZE: usize = 100;

/// Catalog service settings.
///
/// Environment variables:
/// - `STOREFRONT_IMAGE_BASE_URL`: public prefix of the image bucket
/// - `STOREFRONT_DEFAULT_PAGE_SIZE`: page size when a listing asks for none
/// - `STOREFRONT_MAX_PAGE_SIZE`: upper bound for any listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogConfig {
    pub image_base_url: String,
    pub default_page_size: usize,
    pub max_page_size: usize,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            image_base_url: DEFAULT_IMAGE_BASE_URL.to_string(),
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
        }
    }
}

impl CatalogConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key/value source. Missing or unparsable values fall back
    /// to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let image_base_url = lookup("STOREFRONT_IMAGE_BASE_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or(defaults.image_base_url);

        let default_page_size = parse_size(&lookup, "STOREFRONT_DEFAULT_PAGE_SIZE")
            .unwrap_or(defaults.default_page_size);
        let max_page_size =
            parse_size(&lookup, "STOREFRONT_MAX_PAGE_SIZE").unwrap_or(defaults.max_page_size);

        Self {
            image_base_url,
            default_page_size: default_page_size.min(max_page_size),
            max_page_size,
        }
    }

    /// Public URL of an image object.
    pub fn image_url(&self, product_id: ProductId, image_id: ImageId) -> String {
        format!("{}/products/{product_id}/images/{image_id}", self.image_base_url)
    }

    /// Clamp a requested page to `1..=max_page_size`.
    pub fn page(&self, offset: usize, limit: Option<usize>) -> Page {
        let limit = limit
            .unwrap_or(self.default_page_size)
            .clamp(1, self.max_page_size);
        Page::new(offset, limit)
    }
}

fn parse_size(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<usize> {
    let raw = lookup(key)?;
    match raw.trim().parse::<usize>() {
        Ok(0) | Err(_) => {
            tracing::warn!("{key}={raw:?} is not a positive integer; using default");
            None
        }
        Ok(size) => Some(size),
    }
}
