//! Attributes: descriptive facets (e.g. "Material: Cotton") linked to products
//! by id through `Product::add_attribute_ids` / `add_attribute_value_ids`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storefront_core::entity::{find_by_id, find_many_by_ids, stamp_once};
use storefront_core::{
    AggregateRoot, AttributeId, AttributeValueId, Entity, SoftDelete, Validate, ValidationErrors,
    Validator,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeValue {
    id: AttributeValueId,
    value: String,
    deleted_at: Option<DateTime<Utc>>,
}

impl AttributeValue {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            id: AttributeValueId::new(),
            value: value.into(),
            deleted_at: None,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

impl Entity for AttributeValue {
    type Id = AttributeValueId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl SoftDelete for AttributeValue {
    fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }
}

/// Aggregate root: Attribute.
///
/// `code` is the stable machine key (e.g. `material`); `name` is for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    id: AttributeId,
    code: String,
    name: String,
    values: Vec<AttributeValue>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl Attribute {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: AttributeId::new(),
            code: code.into(),
            name: name.into(),
            values: Vec::new(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    /// One value per input string, order and duplicates preserved.
    pub fn create_values<S: AsRef<str>>(values: &[S]) -> Vec<AttributeValue> {
        values.iter().map(|v| AttributeValue::new(v.as_ref())).collect()
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn values(&self) -> &[AttributeValue] {
        &self.values
    }

    pub fn add_values(&mut self, values: impl IntoIterator<Item = AttributeValue>) {
        self.values.extend(values);
    }

    pub fn get_value_by_id(&self, id: AttributeValueId) -> Option<&AttributeValue> {
        find_by_id(&self.values, &id)
    }

    pub fn get_values_by_ids(&self, ids: &[AttributeValueId]) -> Vec<&AttributeValue> {
        find_many_by_ids(&self.values, ids)
    }

    /// Soft-delete the attribute and its values, keeping earlier stamps.
    pub fn remove(&mut self) {
        let now = Utc::now();
        stamp_once(&mut self.deleted_at, now);
        for value in &mut self.values {
            stamp_once(&mut value.deleted_at, now);
        }
        self.updated_at = now;
    }
}

impl Entity for Attribute {
    type Id = AttributeId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl SoftDelete for Attribute {
    fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }
}

impl AggregateRoot for Attribute {
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

impl Validate for Attribute {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        v.required("code", &self.code).required("name", &self.name);
        for (idx, value) in self.values.iter().enumerate() {
            v.required(&format!("values[{idx}].value"), &value.value);
        }
        v.unique_by("values", &self.values, |value| value.value.clone())
            .unique_by("values", &self.values, |value| value.id);
        v.finish()
    }
}

/// Cross-aggregate rule for a batch of attributes: ids and codes must be unique.
pub fn validate_attribute_collection(attributes: &[Attribute]) -> Result<(), ValidationErrors> {
    Validator::new()
        .unique_by("attributes", attributes, |a| a.id)
        .unique_by("attributes", attributes, |a| a.code.clone())
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use storefront_core::ViolationKind;

    fn material() -> Attribute {
        let mut attribute = Attribute::new("material", "Material");
        attribute.add_values(Attribute::create_values(&["Cotton", "Linen"]));
        attribute
    }

    #[test]
    fn valid_attribute_passes() {
        assert!(material().validate().is_ok());
    }

    #[test]
    fn duplicate_value_text_is_rejected() {
        let mut attribute = material();
        attribute.add_values(Attribute::create_values(&["Cotton"]));

        let errors = attribute.validate().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.violations()[0].field, "values[2]");
        assert_eq!(errors.violations()[0].kind, ViolationKind::Duplicate);
    }

    #[test]
    fn duplicate_value_id_is_rejected() {
        let mut attribute = material();
        let mut copy = attribute.values()[0].clone();
        copy.value = "Wool".to_string();
        attribute.add_values([copy]);

        let errors = attribute.validate().unwrap_err();
        assert!(errors.has_field("values[2]"));
    }

    #[test]
    fn blank_code_and_value_are_reported() {
        let mut attribute = Attribute::new("", "Material");
        attribute.add_values(Attribute::create_values(&[""]));

        let errors = attribute.validate().unwrap_err();
        assert!(errors.has_field("code"));
        assert!(errors.has_field("values[0].value"));
    }

    #[test]
    fn collection_rejects_duplicate_codes_and_ids() {
        let first = material();
        let twin = first.clone();
        let same_code = Attribute::new("material", "Fabric");

        let by_id = validate_attribute_collection(&[first.clone(), twin]).unwrap_err();
        assert!(by_id.has_field("attributes[1]"));

        let by_code = validate_attribute_collection(&[first, same_code]).unwrap_err();
        assert_eq!(by_code.len(), 1);
        assert!(by_code.has_kind(&ViolationKind::Duplicate));

        assert!(validate_attribute_collection(&[]).is_ok());
    }

    #[test]
    fn lookups_and_cascading_remove() {
        let mut attribute = material();
        let linen = *attribute.values()[1].id();

        assert_eq!(attribute.get_value_by_id(linen).map(AttributeValue::value), Some("Linen"));
        assert!(attribute.get_value_by_id(AttributeValueId::new()).is_none());
        assert_eq!(attribute.get_values_by_ids(&[linen]).len(), 1);

        attribute.remove();
        let stamp = attribute.deleted_at();
        attribute.remove();
        assert_eq!(attribute.deleted_at(), stamp);
        assert!(attribute.values().iter().all(|v| v.deleted_at() == stamp));
    }
}
