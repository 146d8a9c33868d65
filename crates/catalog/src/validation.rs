//! Structural and field validation for the product aggregate.
//!
//! [`validate_product_variant_structure`] is the whole-product shape rule
//! relating options to variants. [`Validate`] impls add the per-field rules and
//! run the shape rule as a struct-level check, so one call reports everything.

use storefront_core::{Validate, ValidationErrors, Validator};

use crate::image::ProductImage;
use crate::option::{OptionValue, ProductOption};
use crate::product::Product;
use crate::variant::ProductVariant;

pub const PRODUCT_NAME_MIN: usize = 3;
pub const PRODUCT_NAME_MAX: usize = 200;
pub const PRODUCT_DESCRIPTION_MIN: usize = 10;
pub const RATING_MAX: f64 = 5.0;

/// Name under which the shape rule shows up in [`ValidationErrors`].
pub const VARIANT_STRUCTURE_RULE: &str = "variant_structure";

/// Options/variants shape rule.
///
/// - no options: exactly one variant, carrying no option values;
/// - `k` options: every variant carries exactly `k` option values.
///
/// Only counts are compared. Whether each value belongs to one of the product's
/// options, or two values come from the same option, is not checked.
pub fn validate_product_variant_structure(product: &Product) -> bool {
    let option_count = product.options().len();
    let variants = product.variants();

    if option_count == 0 {
        return variants.len() == 1 && variants[0].option_values().is_empty();
    }

    variants
        .iter()
        .all(|variant| variant.option_values().len() == option_count)
}

impl Validate for OptionValue {
    fn validate(&self) -> Result<(), ValidationErrors> {
        Validator::new().required("value", self.value()).finish()
    }
}

impl Validate for ProductOption {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        v.required("name", self.name());
        for (idx, value) in self.values().iter().enumerate() {
            v.nested(&format!("values[{idx}]"), value.validate());
        }
        v.finish()
    }
}

impl Validate for ProductImage {
    fn validate(&self) -> Result<(), ValidationErrors> {
        Validator::new()
            .required("url", self.url())
            .url("url", self.url())
            .finish()
    }
}

impl Validate for ProductVariant {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        v.required("sku", self.sku())
            .min("price", self.price(), 1)
            .min("quantity", self.quantity(), 0)
            .min("purchase_count", self.purchase_count(), 0);
        for (idx, image) in self.images().iter().enumerate() {
            v.nested(&format!("images[{idx}]"), image.validate());
        }
        v.finish()
    }
}

impl Validate for Product {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        v.required("name", self.name())
            .length("name", self.name(), PRODUCT_NAME_MIN, Some(PRODUCT_NAME_MAX))
            .length("description", self.description(), PRODUCT_DESCRIPTION_MIN, None)
            .present("category_id", !self.category_id().is_nil())
            .min("price", self.price(), 0)
            .range("rating", self.rating(), 0.0, RATING_MAX);

        for (idx, option) in self.options().iter().enumerate() {
            v.nested(&format!("options[{idx}]"), option.validate());
        }
        for (idx, variant) in self.variants().iter().enumerate() {
            v.nested(&format!("variants[{idx}]"), variant.validate());
        }
        for (idx, image) in self.images().iter().enumerate() {
            v.nested(&format!("images[{idx}]"), image.validate());
        }

        v.check(
            "variants",
            VARIANT_STRUCTURE_RULE,
            validate_product_variant_structure(self),
            structure_message(self),
        );
        v.finish()
    }
}

fn structure_message(product: &Product) -> String {
    match product.options().len() {
        0 => format!(
            "a product without options needs exactly one plain variant, found {} variant(s)",
            product.variants().len()
        ),
        k => format!("every variant must select exactly {k} option value(s)"),
    }
}
