use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storefront_core::entity::stamp_once;
use storefront_core::{
    AggregateRoot, CategoryId, Entity, SoftDelete, Validate, ValidationErrors, Validator,
};

pub const CATEGORY_NAME_MIN: usize = 2;
pub const CATEGORY_NAME_MAX: usize = 100;

/// A node of the category tree products are filed under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    id: CategoryId,
    name: String,
    description: String,
    parent_id: Option<CategoryId>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl Category {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        parent_id: Option<CategoryId>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: CategoryId::new(),
            name: name.into(),
            description: description.into(),
            parent_id,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn parent_id(&self) -> Option<CategoryId> {
        self.parent_id
    }

    /// Same rules as the product: empty/`None` keeps a field, and `updated_at`
    /// only moves on a real change.
    pub fn update(&mut self, name: &str, description: &str, parent_id: Option<CategoryId>) {
        let mut changed = false;
        if !name.is_empty() && self.name != name {
            self.name = name.to_string();
            changed = true;
        }
        if !description.is_empty() && self.description != description {
            self.description = description.to_string();
            changed = true;
        }
        if let Some(parent_id) = parent_id.filter(|id| !id.is_nil()) {
            if self.parent_id != Some(parent_id) {
                self.parent_id = Some(parent_id);
                changed = true;
            }
        }
        if changed {
            self.updated_at = Utc::now();
        }
    }

    pub fn remove(&mut self) {
        let now = Utc::now();
        if stamp_once(&mut self.deleted_at, now) {
            self.updated_at = now;
        }
    }
}

impl Entity for Category {
    type Id = CategoryId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl SoftDelete for Category {
    fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }
}

impl AggregateRoot for Category {
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

impl Validate for Category {
    fn validate(&self) -> Result<(), ValidationErrors> {
        Validator::new()
            .required("name", &self.name)
            .length("name", &self.name, CATEGORY_NAME_MIN, Some(CATEGORY_NAME_MAX))
            .check(
                "parent_id",
                "not_self_parent",
                self.parent_id != Some(self.id),
                "a category cannot be its own parent",
            )
            .finish()
    }
}
