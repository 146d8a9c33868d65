use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storefront_core::entity::stamp_once;
use storefront_core::{Entity, SoftDelete, VariantId};

use crate::image::ProductImage;
use crate::option::OptionValue;

/// A purchasable SKU of a product.
///
/// `option_values` holds copies of the values picked from the owning product's
/// options, one per option axis. Prices are in the smallest currency unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductVariant {
    id: VariantId,
    sku: String,
    price: i64,
    quantity: i64,
    purchase_count: i64,
    option_values: Vec<OptionValue>,
    images: Vec<ProductImage>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl ProductVariant {
    pub fn new(sku: impl Into<String>, price: i64, quantity: i64) -> Self {
        let now = Utc::now();
        Self {
            id: VariantId::new(),
            sku: sku.into(),
            price,
            quantity,
            purchase_count: 0,
            option_values: Vec::new(),
            images: Vec::new(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    pub fn sku(&self) -> &str {
        &self.sku
    }

    pub fn price(&self) -> i64 {
        self.price
    }

    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    pub fn purchase_count(&self) -> i64 {
        self.purchase_count
    }

    pub fn option_values(&self) -> &[OptionValue] {
        &self.option_values
    }

    pub fn images(&self) -> &[ProductImage] {
        &self.images
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn add_option_values(&mut self, values: impl IntoIterator<Item = OptionValue>) {
        self.option_values.extend(values);
    }

    pub fn add_images(&mut self, images: impl IntoIterator<Item = ProductImage>) {
        self.images.extend(images);
    }

    /// Override price and/or quantity. Zero leaves the field as is.
    ///
    /// Returns whether anything changed; `updated_at` only moves when it did.
    pub fn update(&mut self, price: i64, quantity: i64) -> bool {
        let mut changed = false;
        if price != 0 && price != self.price {
            self.price = price;
            changed = true;
        }
        if quantity != 0 && quantity != self.quantity {
            self.quantity = quantity;
            changed = true;
        }
        if changed {
            self.updated_at = Utc::now();
        }
        changed
    }

    /// Take `n` units out of stock.
    ///
    /// Stock floors at zero, but the full `n` is credited to `purchase_count`
    /// even when it exceeds what was available (oversell bookkeeping).
    /// Non-positive `n` is ignored.
    pub fn decrease_quantity(&mut self, n: i64) {
        if n <= 0 {
            return;
        }
        self.quantity = self.quantity.saturating_sub(n).max(0);
        self.purchase_count = self.purchase_count.saturating_add(n);
        self.updated_at = Utc::now();
    }

    /// Soft-delete the variant together with its images.
    pub fn remove(&mut self) {
        self.remove_at(Utc::now());
    }

    pub(crate) fn remove_at(&mut self, at: DateTime<Utc>) {
        if stamp_once(&mut self.deleted_at, at) {
            self.updated_at = at;
        }
        for image in &mut self.images {
            image.remove_at(at);
        }
    }
}

impl Entity for ProductVariant {
    type Id = VariantId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl SoftDelete for ProductVariant {
    fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    /// Variant whose timestamps sit an hour in the past, so any bump is visible.
    fn aged_variant(quantity: i64) -> ProductVariant {
        let mut variant = ProductVariant::new("SKU-1", 10_000, quantity);
        variant.updated_at -= Duration::hours(1);
        variant
    }

    #[test]
    fn new_variant_starts_clean() {
        let variant = ProductVariant::new("SKU-1", 10_000, 5);
        assert_eq!(variant.sku(), "SKU-1");
        assert_eq!(variant.price(), 10_000);
        assert_eq!(variant.quantity(), 5);
        assert_eq!(variant.purchase_count(), 0);
        assert_eq!(variant.created_at(), variant.updated_at());
        assert!(variant.option_values().is_empty());
        assert!(variant.images().is_empty());
    }

    #[test]
    fn decrease_within_stock() {
        let mut variant = aged_variant(5);
        let before = variant.updated_at();
        variant.decrease_quantity(3);

        assert_eq!(variant.quantity(), 2);
        assert_eq!(variant.purchase_count(), 3);
        assert!(variant.updated_at() > before);
    }

    #[test]
    fn decrease_past_stock_floors_quantity_but_credits_everything() {
        let mut variant = aged_variant(2);
        variant.decrease_quantity(5);

        assert_eq!(variant.quantity(), 0);
        // Oversold units still count as purchased.
        assert_eq!(variant.purchase_count(), 5);
    }

    #[test]
    fn non_positive_decrease_is_a_noop() {
        let mut variant = aged_variant(5);
        let before = variant.clone();

        variant.decrease_quantity(0);
        variant.decrease_quantity(-4);
        assert_eq!(variant, before);
    }

    #[test]
    fn update_with_zeroes_changes_nothing() {
        let mut variant = aged_variant(5);
        let before = variant.clone();

        assert!(!variant.update(0, 0));
        assert_eq!(variant, before);
    }

    #[test]
    fn update_with_same_values_does_not_touch_timestamp() {
        let mut variant = aged_variant(5);
        let before = variant.updated_at();

        assert!(!variant.update(10_000, 5));
        assert_eq!(variant.updated_at(), before);
    }

    #[test]
    fn update_overrides_non_zero_fields() {
        let mut variant = aged_variant(5);
        let before = variant.updated_at();

        assert!(variant.update(0, 9));
        assert_eq!(variant.price(), 10_000);
        assert_eq!(variant.quantity(), 9);
        assert!(variant.updated_at() > before);

        assert!(variant.update(7_500, 0));
        assert_eq!(variant.price(), 7_500);
    }

    #[test]
    fn remove_is_idempotent_and_cascades_to_images() {
        let mut variant = aged_variant(1);
        variant.add_images([ProductImage::new(0, |id| format!("https://cdn.example.com/{id}"))]);

        variant.remove();
        let stamp = variant.deleted_at();
        let touched = variant.updated_at();
        assert!(stamp.is_some());
        assert_eq!(variant.images()[0].deleted_at(), stamp);

        variant.remove();
        assert_eq!(variant.deleted_at(), stamp);
        assert_eq!(variant.updated_at(), touched);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: stock never goes negative and every requested unit is credited.
            #[test]
            fn quantity_floor(start in 0_i64..10_000, n in 1_i64..20_000) {
                let mut variant = ProductVariant::new("SKU-P", 100, start);
                variant.decrease_quantity(n);

                prop_assert_eq!(variant.quantity(), (start - n).max(0));
                prop_assert_eq!(variant.purchase_count(), n);
            }

            /// Property: purchase count only increases across any sequence of decrements.
            #[test]
            fn purchase_count_is_monotonic(steps in proptest::collection::vec(-50_i64..50, 0..30)) {
                let mut variant = ProductVariant::new("SKU-P", 100, 25);
                let mut previous = variant.purchase_count();
                for n in steps {
                    variant.decrease_quantity(n);
                    prop_assert!(variant.purchase_count() >= previous);
                    prop_assert!(variant.quantity() >= 0);
                    previous = variant.purchase_count();
                }
            }
        }
    }
}
