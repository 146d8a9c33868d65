use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storefront_core::entity::{find_by_id, find_by_id_mut, find_many_by_ids, stamp_once};
use storefront_core::{Entity, OptionId, OptionValueId, SoftDelete};

/// A named choice on a variation axis (e.g. "Red" on "Color").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionValue {
    id: OptionValueId,
    value: String,
    deleted_at: Option<DateTime<Utc>>,
}

impl OptionValue {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            id: OptionValueId::new(),
            value: value.into(),
            deleted_at: None,
        }
    }

    /// One value per input string, in order. Blanks and duplicates are kept;
    /// validation happens on the owning product.
    pub fn create_values<S: AsRef<str>>(values: &[S]) -> Vec<Self> {
        values.iter().map(|v| Self::new(v.as_ref())).collect()
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Replace the value. Returns whether anything changed.
    pub fn set_value(&mut self, value: impl Into<String>) -> bool {
        let value = value.into();
        if self.value == value {
            return false;
        }
        self.value = value;
        true
    }

    pub fn remove(&mut self) {
        self.remove_at(Utc::now());
    }

    pub(crate) fn remove_at(&mut self, at: DateTime<Utc>) -> bool {
        stamp_once(&mut self.deleted_at, at)
    }
}

impl Entity for OptionValue {
    type Id = OptionValueId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl SoftDelete for OptionValue {
    fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }
}

/// A named variation axis (e.g. "Color") owning its values exclusively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductOption {
    id: OptionId,
    name: String,
    values: Vec<OptionValue>,
    deleted_at: Option<DateTime<Utc>>,
}

impl ProductOption {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: OptionId::new(),
            name: name.into(),
            values: Vec::new(),
            deleted_at: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn values(&self) -> &[OptionValue] {
        &self.values
    }

    pub fn add_option_values(&mut self, values: impl IntoIterator<Item = OptionValue>) {
        self.values.extend(values);
    }

    pub fn get_value_by_id(&self, id: OptionValueId) -> Option<&OptionValue> {
        find_by_id(&self.values, &id)
    }

    pub fn get_values_by_ids(&self, ids: &[OptionValueId]) -> Vec<&OptionValue> {
        find_many_by_ids(&self.values, ids)
    }

    pub(crate) fn get_value_mut(&mut self, id: OptionValueId) -> Option<&mut OptionValue> {
        find_by_id_mut(&mut self.values, &id)
    }

    /// Rename the option. Returns whether anything changed.
    pub fn set_name(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        if self.name == name {
            return false;
        }
        self.name = name;
        true
    }

    /// Soft-delete the option and every value it owns.
    pub fn remove(&mut self) {
        self.remove_at(Utc::now());
    }

    pub(crate) fn remove_at(&mut self, at: DateTime<Utc>) {
        stamp_once(&mut self.deleted_at, at);
        for value in &mut self.values {
            value.remove_at(at);
        }
    }
}

impl Entity for ProductOption {
    type Id = OptionId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl SoftDelete for ProductOption {
    fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }
}
