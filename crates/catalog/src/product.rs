use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storefront_core::entity::{find_by_id, find_by_id_mut, find_many_by_ids, stamp_once};
use storefront_core::{
    AggregateRoot, AttributeId, AttributeValueId, CategoryId, DomainError, DomainResult, Entity,
    OptionId, OptionValueId, ProductId, SoftDelete, VariantId,
};

use crate::image::ProductImage;
use crate::option::{OptionValue, ProductOption};
use crate::variant::ProductVariant;

/// Aggregate root: Product.
///
/// Owns its options, variants and images. Nothing here is synchronized: mutators
/// take `&mut self`, and the caller keeps a single writer per instance for the
/// duration of a request.
///
/// Mutators do not check the options/variants shape. Run
/// [`crate::validation::validate_product_variant_structure`] (or
/// [`Product::validate`]) after any structural change and before persisting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    id: ProductId,
    name: String,
    description: String,
    category_id: CategoryId,
    price: i64,
    rating: f64,
    views_count: u64,
    total_purchase: i64,
    trending_score: f64,
    attribute_ids: Vec<AttributeId>,
    attribute_value_ids: Vec<AttributeValueId>,
    options: Vec<ProductOption>,
    variants: Vec<ProductVariant>,
    images: Vec<ProductImage>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl Product {
    /// Create a product with fresh identity and no options, variants or images.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        category_id: CategoryId,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: ProductId::new(),
            name: name.into(),
            description: description.into(),
            category_id,
            price: 0,
            rating: 0.0,
            views_count: 0,
            total_purchase: 0,
            trending_score: 0.0,
            attribute_ids: Vec::new(),
            attribute_value_ids: Vec::new(),
            options: Vec::new(),
            variants: Vec::new(),
            images: Vec::new(),
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

    pub fn category_id(&self) -> CategoryId {
        self.category_id
    }

    /// Lowest variant price as of the last [`Product::update_min_price`].
    pub fn price(&self) -> i64 {
        self.price
    }

    pub fn rating(&self) -> f64 {
        self.rating
    }

    pub fn views_count(&self) -> u64 {
        self.views_count
    }

    pub fn total_purchase(&self) -> i64 {
        self.total_purchase
    }

    pub fn trending_score(&self) -> f64 {
        self.trending_score
    }

    pub fn attribute_ids(&self) -> &[AttributeId] {
        &self.attribute_ids
    }

    pub fn attribute_value_ids(&self) -> &[AttributeValueId] {
        &self.attribute_value_ids
    }

    pub fn options(&self) -> &[ProductOption] {
        &self.options
    }

    pub fn variants(&self) -> &[ProductVariant] {
        &self.variants
    }

    pub fn images(&self) -> &[ProductImage] {
        &self.images
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Replace descriptive fields. Empty strings and `None`/nil ids are ignored.
    ///
    /// `updated_at` only advances when a field actually changed.
    pub fn update(&mut self, name: &str, description: &str, category_id: Option<CategoryId>) {
        let mut changed = false;
        if !name.is_empty() && self.name != name {
            self.name = name.to_string();
            changed = true;
        }
        if !description.is_empty() && self.description != description {
            self.description = description.to_string();
            changed = true;
        }
        if let Some(category_id) = category_id.filter(|id| !id.is_nil()) {
            if self.category_id != category_id {
                self.category_id = category_id;
                changed = true;
            }
        }
        if changed {
            self.touch();
        }
    }

    pub fn add_options(&mut self, options: impl IntoIterator<Item = ProductOption>) {
        self.options.extend(options);
    }

    pub fn add_variants(&mut self, variants: impl IntoIterator<Item = ProductVariant>) {
        self.variants.extend(variants);
    }

    pub fn add_images(&mut self, images: impl IntoIterator<Item = ProductImage>) {
        self.images.extend(images);
    }

    /// Append attribute associations. Duplicates are the caller's concern.
    pub fn add_attribute_ids(&mut self, ids: impl IntoIterator<Item = AttributeId>) {
        self.attribute_ids.extend(ids);
    }

    pub fn add_attribute_value_ids(&mut self, ids: impl IntoIterator<Item = AttributeValueId>) {
        self.attribute_value_ids.extend(ids);
    }

    pub fn get_option_by_id(&self, id: OptionId) -> Option<&ProductOption> {
        find_by_id(&self.options, &id)
    }

    /// Options whose id is in `ids`, in the product's own option order.
    pub fn get_options_by_ids(&self, ids: &[OptionId]) -> Vec<&ProductOption> {
        find_many_by_ids(&self.options, ids)
    }

    pub fn get_variant_by_id(&self, id: VariantId) -> Option<&ProductVariant> {
        find_by_id(&self.variants, &id)
    }

    fn variant_mut(&mut self, id: VariantId) -> DomainResult<&mut ProductVariant> {
        find_by_id_mut(&mut self.variants, &id)
            .ok_or_else(|| DomainError::not_found("variant", id))
    }

    fn option_mut(&mut self, id: OptionId) -> DomainResult<&mut ProductOption> {
        find_by_id_mut(&mut self.options, &id).ok_or_else(|| DomainError::not_found("option", id))
    }

    /// Override a variant's price and/or quantity (zero means "keep").
    pub fn update_variant(
        &mut self,
        variant_id: VariantId,
        price: i64,
        quantity: i64,
    ) -> DomainResult<()> {
        if self.variant_mut(variant_id)?.update(price, quantity) {
            self.touch();
        }
        Ok(())
    }

    /// Rename an option. An empty name leaves it unchanged.
    pub fn update_option(&mut self, option_id: OptionId, name: &str) -> DomainResult<()> {
        let option = self.option_mut(option_id)?;
        if !name.is_empty() && option.set_name(name) {
            self.touch();
        }
        Ok(())
    }

    /// Replace the text of one value under one option. An empty value is ignored.
    pub fn update_option_value(
        &mut self,
        option_id: OptionId,
        value_id: OptionValueId,
        value: &str,
    ) -> DomainResult<()> {
        let option = self.option_mut(option_id)?;
        let option_value: &mut OptionValue = option
            .get_value_mut(value_id)
            .ok_or_else(|| DomainError::not_found("option value", value_id))?;
        if !value.is_empty() && option_value.set_value(value) {
            self.touch();
        }
        Ok(())
    }

    /// Recompute `price` as the cheapest variant, or zero without variants.
    ///
    /// Not called implicitly; run it after any variant price change.
    pub fn update_min_price(&mut self) {
        self.price = self.variants.iter().map(ProductVariant::price).min().unwrap_or(0);
    }

    pub fn add_variant_images(
        &mut self,
        variant_id: VariantId,
        images: impl IntoIterator<Item = ProductImage>,
    ) -> DomainResult<()> {
        self.variant_mut(variant_id)?.add_images(images);
        Ok(())
    }

    /// Take stock out of a variant and credit the purchase to the product.
    ///
    /// Same floor/credit rules as [`ProductVariant::decrease_quantity`].
    pub fn record_purchase(&mut self, variant_id: VariantId, quantity: i64) -> DomainResult<()> {
        let variant = self.variant_mut(variant_id)?;
        if quantity <= 0 {
            return Ok(());
        }
        variant.decrease_quantity(quantity);
        self.total_purchase = self.total_purchase.saturating_add(quantity);
        self.touch();
        Ok(())
    }

    pub fn record_view(&mut self) {
        self.views_count = self.views_count.saturating_add(1);
    }

    /// Store the aggregated review rating. Range is enforced by validation.
    pub fn set_rating(&mut self, rating: f64) {
        self.rating = rating;
    }

    pub fn set_trending_score(&mut self, score: f64) {
        self.trending_score = score;
    }

    /// Soft-delete the product and everything it owns with one shared timestamp.
    ///
    /// Sub-entities that were already removed keep their original timestamp.
    pub fn remove(&mut self) {
        let now = Utc::now();
        stamp_once(&mut self.deleted_at, now);
        for option in &mut self.options {
            option.remove_at(now);
        }
        for variant in &mut self.variants {
            variant.remove_at(now);
        }
        for image in &mut self.images {
            image.remove_at(now);
        }
        self.updated_at = now;
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl SoftDelete for Product {
    fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }
}

impl AggregateRoot for Product {
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn test_category_id() -> CategoryId {
        CategoryId::new()
    }

    fn t_shirt() -> Product {
        Product::new("T-Shirt", "A soft cotton shirt", test_category_id())
    }

    /// Push `updated_at` into the past so a bump is observable.
    fn aged(mut product: Product) -> Product {
        product.updated_at -= Duration::hours(1);
        product
    }

    fn image() -> ProductImage {
        ProductImage::new(0, |id| format!("https://cdn.example.com/products/{id}.webp"))
    }

    fn sized_product() -> Product {
        let mut size = ProductOption::new("Size");
        size.add_option_values(OptionValue::create_values(&["S", "M"]));

        let mut variant = ProductVariant::new("TS-S", 10_000, 5);
        variant.add_option_values([size.values()[0].clone()]);
        variant.add_images([image()]);

        let mut product = t_shirt();
        product.add_options([size]);
        product.add_variants([variant]);
        product.add_images([image()]);
        product
    }

    #[test]
    fn new_product_is_empty_with_matching_timestamps() {
        let category_id = test_category_id();
        let product = Product::new("T-Shirt", "A soft cotton shirt", category_id);

        assert_eq!(product.name(), "T-Shirt");
        assert_eq!(product.category_id(), category_id);
        assert_eq!(product.price(), 0);
        assert_eq!(product.created_at(), product.updated_at());
        assert!(product.options().is_empty());
        assert!(product.variants().is_empty());
        assert!(product.images().is_empty());
        assert!(product.attribute_ids().is_empty());
        assert!(product.deleted_at().is_none());
    }

    #[test]
    fn min_price_follows_cheapest_variant() {
        let mut product = t_shirt();
        product.add_variants([ProductVariant::new("SKU-1", 10_000, 5)]);
        product.update_min_price();
        assert_eq!(product.price(), 10_000);

        product.add_variants([ProductVariant::new("SKU-2", 8_000, 3)]);
        product.update_min_price();
        assert_eq!(product.price(), 8_000);
    }

    #[test]
    fn min_price_without_variants_is_zero() {
        let mut product = t_shirt();
        product.add_variants([ProductVariant::new("SKU-1", 10_000, 5)]);
        product.update_min_price();
        product.variants.clear();
        product.update_min_price();
        assert_eq!(product.price(), 0);
    }

    #[test]
    fn min_price_is_not_recomputed_implicitly() {
        let mut product = t_shirt();
        let variant = ProductVariant::new("SKU-1", 10_000, 5);
        let variant_id = *variant.id();
        product.add_variants([variant]);
        product.update_min_price();

        product.update_variant(variant_id, 4_000, 0).unwrap();
        assert_eq!(product.price(), 10_000);
        product.update_min_price();
        assert_eq!(product.price(), 4_000);
    }

    #[test]
    fn update_with_nothing_keeps_timestamp() {
        let mut product = aged(t_shirt());
        let before = product.updated_at();

        product.update("", "", None);
        product.update("T-Shirt", "A soft cotton shirt", Some(product.category_id()));
        product.update("", "", Some(CategoryId::from_uuid(uuid::Uuid::nil())));

        assert_eq!(product.updated_at(), before);
        assert_eq!(product.name(), "T-Shirt");
    }

    #[test]
    fn update_replaces_only_given_fields() {
        let mut product = aged(t_shirt());
        let before = product.updated_at();
        let category_id = product.category_id();

        product.update("Polo Shirt", "", None);

        assert_eq!(product.name(), "Polo Shirt");
        assert_eq!(product.description(), "A soft cotton shirt");
        assert_eq!(product.category_id(), category_id);
        assert!(product.updated_at() > before);
    }

    #[test]
    fn update_moves_category() {
        let mut product = t_shirt();
        let other = test_category_id();
        product.update("", "", Some(other));
        assert_eq!(product.category_id(), other);
    }

    #[test]
    fn add_attribute_associations_keeps_duplicates() {
        let mut product = t_shirt();
        let attribute = AttributeId::new();
        product.add_attribute_ids([attribute, attribute]);
        product.add_attribute_value_ids([AttributeValueId::new()]);

        assert_eq!(product.attribute_ids(), &[attribute, attribute]);
        assert_eq!(product.attribute_value_ids().len(), 1);
    }

    #[test]
    fn lookups_are_silent_on_unknown_ids() {
        let product = sized_product();
        let option_id = *product.options()[0].id();

        assert!(product.get_option_by_id(option_id).is_some());
        assert!(product.get_option_by_id(OptionId::new()).is_none());
        assert!(product.get_variant_by_id(VariantId::new()).is_none());
        assert!(product.get_options_by_ids(&[]).is_empty());
        assert_eq!(product.get_options_by_ids(&[OptionId::new(), option_id]).len(), 1);
    }

    #[test]
    fn options_by_ids_follow_product_order() {
        let mut product = t_shirt();
        product.add_options([
            ProductOption::new("Size"),
            ProductOption::new("Color"),
            ProductOption::new("Fit"),
        ]);
        let ids: Vec<OptionId> = product.options().iter().map(|o| *o.id()).collect();

        let names: Vec<&str> = product
            .get_options_by_ids(&[ids[2], ids[0]])
            .into_iter()
            .map(ProductOption::name)
            .collect();
        assert_eq!(names, vec!["Size", "Fit"]);
    }

    #[test]
    fn update_variant_unknown_id_is_not_found() {
        let mut product = sized_product();
        let err = product.update_variant(VariantId::new(), 1, 1).unwrap_err();
        match err {
            DomainError::NotFound { entity, .. } => assert_eq!(entity, "variant"),
            other => panic!("Expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn update_variant_with_zeroes_is_a_noop() {
        let mut product = aged(sized_product());
        let variant_id = *product.variants()[0].id();
        let before = product.clone();

        product.update_variant(variant_id, 0, 0).unwrap();
        assert_eq!(product, before);
    }

    #[test]
    fn update_variant_applies_overrides() {
        let mut product = aged(sized_product());
        let variant_id = *product.variants()[0].id();
        let before = product.updated_at();

        product.update_variant(variant_id, 12_500, 0).unwrap();

        let variant = product.get_variant_by_id(variant_id).unwrap();
        assert_eq!(variant.price(), 12_500);
        assert_eq!(variant.quantity(), 5);
        assert!(product.updated_at() > before);
    }

    #[test]
    fn update_option_renames_and_ignores_empty() {
        let mut product = sized_product();
        let option_id = *product.options()[0].id();

        product.update_option(option_id, "").unwrap();
        assert_eq!(product.get_option_by_id(option_id).unwrap().name(), "Size");

        product.update_option(option_id, "Shirt Size").unwrap();
        assert_eq!(product.get_option_by_id(option_id).unwrap().name(), "Shirt Size");

        assert!(product.update_option(OptionId::new(), "x").unwrap_err().is_not_found());
    }

    #[test]
    fn update_option_value_requires_both_ids() {
        let mut product = sized_product();
        let option_id = *product.options()[0].id();
        let value_id = *product.options()[0].values()[1].id();

        let missing_option = product
            .update_option_value(OptionId::new(), value_id, "XL")
            .unwrap_err();
        assert!(missing_option.is_not_found());

        let missing_value = product
            .update_option_value(option_id, OptionValueId::new(), "XL")
            .unwrap_err();
        match missing_value {
            DomainError::NotFound { entity, .. } => assert_eq!(entity, "option value"),
            other => panic!("Expected NotFound, got {other:?}"),
        }

        product.update_option_value(option_id, value_id, "").unwrap();
        assert_eq!(product.options()[0].values()[1].value(), "M");

        product.update_option_value(option_id, value_id, "Medium").unwrap();
        assert_eq!(product.options()[0].values()[1].value(), "Medium");
    }

    #[test]
    fn add_variant_images_targets_one_variant() {
        let mut product = sized_product();
        let variant_id = *product.variants()[0].id();

        product.add_variant_images(variant_id, [image(), image()]).unwrap();
        assert_eq!(product.variants()[0].images().len(), 3);

        let err = product.add_variant_images(VariantId::new(), [image()]).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn record_purchase_credits_product_and_variant() {
        let mut product = sized_product();
        let variant_id = *product.variants()[0].id();

        product.record_purchase(variant_id, 7).unwrap();

        let variant = product.get_variant_by_id(variant_id).unwrap();
        assert_eq!(variant.quantity(), 0);
        assert_eq!(variant.purchase_count(), 7);
        assert_eq!(product.total_purchase(), 7);

        assert!(product.record_purchase(VariantId::new(), 1).unwrap_err().is_not_found());
    }

    #[test]
    fn record_purchase_ignores_non_positive_amounts() {
        let mut product = aged(sized_product());
        let variant_id = *product.variants()[0].id();
        let before = product.clone();

        product.record_purchase(variant_id, 0).unwrap();
        product.record_purchase(variant_id, -3).unwrap();
        assert_eq!(product, before);
    }

    #[test]
    fn record_view_counts() {
        let mut product = t_shirt();
        product.record_view();
        product.record_view();
        assert_eq!(product.views_count(), 2);
    }

    #[test]
    fn remove_cascades_one_timestamp() {
        let mut product = sized_product();
        product.remove();

        let stamp = product.deleted_at();
        assert!(stamp.is_some());
        assert_eq!(product.updated_at(), stamp.unwrap());
        for option in product.options() {
            assert_eq!(option.deleted_at(), stamp);
            assert!(option.values().iter().all(|v| v.deleted_at() == stamp));
        }
        for variant in product.variants() {
            assert_eq!(variant.deleted_at(), stamp);
            assert!(variant.images().iter().all(|i| i.deleted_at() == stamp));
        }
        assert!(product.images().iter().all(|i| i.deleted_at() == stamp));
    }

    #[test]
    fn remove_twice_keeps_deleted_at_but_touches_updated_at() {
        let mut product = sized_product();
        product.remove();
        let stamp = product.deleted_at();
        product.updated_at -= Duration::hours(1);
        let aged_updated = product.updated_at();

        product.remove();
        assert_eq!(product.deleted_at(), stamp);
        assert_eq!(product.variants()[0].deleted_at(), stamp);
        assert!(product.updated_at() > aged_updated);
    }

    #[test]
    fn remove_leaves_already_removed_children_alone() {
        let mut product = sized_product();
        let earlier = Utc::now() - Duration::days(2);
        product.variants[0].remove_at(earlier);

        product.remove();
        assert_eq!(product.variants()[0].deleted_at(), Some(earlier));
        assert_ne!(product.deleted_at(), Some(earlier));
    }

    #[test]
    fn snapshot_survives_serde() {
        let product = sized_product();
        let json = serde_json::to_string(&product).unwrap();
        let restored: Product = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, product);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: min price is the minimum variant price, whatever the variant order.
            #[test]
            fn min_price_is_order_independent(
                prices in proptest::collection::vec(1_i64..1_000_000, 1..12)
            ) {
                let expected = *prices.iter().min().unwrap();

                let mut forward = t_shirt();
                forward.add_variants(prices.iter().map(|p| ProductVariant::new("SKU", *p, 1)));
                forward.update_min_price();

                let mut backward = t_shirt();
                backward.add_variants(
                    prices.iter().rev().map(|p| ProductVariant::new("SKU", *p, 1)),
                );
                backward.update_min_price();

                prop_assert_eq!(forward.price(), expected);
                prop_assert_eq!(backward.price(), expected);
            }

            /// Property: a second remove never changes any deleted_at.
            #[test]
            fn remove_is_idempotent(variants in 0_usize..5, options in 0_usize..4) {
                let mut product = t_shirt();
                for i in 0..options {
                    let mut option = ProductOption::new(format!("Option {i}"));
                    option.add_option_values(OptionValue::create_values(&["a", "b"]));
                    product.add_options([option]);
                }
                product.add_variants(
                    (0..variants).map(|i| ProductVariant::new(format!("SKU-{i}"), 100, 1)),
                );

                product.remove();
                let first = product.clone();
                product.remove();

                prop_assert_eq!(product.deleted_at(), first.deleted_at());
                for (a, b) in product.options().iter().zip(first.options()) {
                    prop_assert_eq!(a.deleted_at(), b.deleted_at());
                }
                for (a, b) in product.variants().iter().zip(first.variants()) {
                    prop_assert_eq!(a.deleted_at(), b.deleted_at());
                }
            }
        }
    }
}
