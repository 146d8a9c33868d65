use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storefront_core::entity::stamp_once;
use storefront_core::{Entity, ImageId, SoftDelete};

/// An image attached to a product, or to one of its variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductImage {
    id: ImageId,
    url: String,
    order: u32,
    created_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl ProductImage {
    /// Create an image whose URL is derived from its own identity.
    ///
    /// The id is generated first and handed to `url_builder`, so storage
    /// adapters can embed it in the object key.
    pub fn new(order: u32, url_builder: impl FnOnce(ImageId) -> String) -> Self {
        let id = ImageId::new();
        let url = url_builder(id);
        Self {
            id,
            url,
            order,
            created_at: Utc::now(),
            deleted_at: None,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Display position; lower comes first.
    pub fn order(&self) -> u32 {
        self.order
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn remove(&mut self) {
        self.remove_at(Utc::now());
    }

    pub(crate) fn remove_at(&mut self, at: DateTime<Utc>) -> bool {
        stamp_once(&mut self.deleted_at, at)
    }
}

impl Entity for ProductImage {
    type Id = ImageId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl SoftDelete for ProductImage {
    fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }
}
