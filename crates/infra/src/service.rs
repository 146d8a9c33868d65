//! Catalog application service.
//!
//! Every write follows the same pipeline:
//!
//! ```text
//! load (or build) aggregate
//!   ↓
//! mutate through aggregate methods
//!   ↓
//! recompute derived price
//!   ↓
//! validate fields + options/variants structure
//!   ↓
//! persist through the repository port
//! ```
//!
//! Each call owns its aggregate copy for the duration of the call, which keeps a
//! single writer per instance.

use thiserror::Error;

use storefront_catalog::{
    Category, CategoryRepository, OptionValue, Product, ProductFilter, ProductImage,
    ProductOption, ProductPage, ProductRepository, ProductVariant, RepositoryError,
};
use storefront_core::{
    AttributeId, AttributeValueId, CategoryId, DomainError, Entity, ImageId, OptionId,
    OptionValueId, ProductId, SoftDelete, Validate, Validator, VariantId,
};

use crate::config::CatalogConfig;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("repository: {0}")]
    Repository(#[from] RepositoryError),
    /// The product exists but was soft-deleted.
    #[error("product {0} has been removed")]
    ProductRemoved(ProductId),
    #[error("category {0} does not exist")]
    UnknownCategory(CategoryId),
}

impl CatalogError {
    /// Whether callers should answer with a 404-equivalent.
    pub fn is_not_found(&self) -> bool {
        match self {
            CatalogError::Domain(e) => e.is_not_found(),
            CatalogError::Repository(RepositoryError::NotFound) => true,
            CatalogError::ProductRemoved(_) | CatalogError::UnknownCategory(_) => true,
            CatalogError::Repository(_) => false,
        }
    }
}

pub type CatalogResult<T> = Result<T, CatalogError>;

/// An option axis and its values, as submitted on product creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOption {
    pub name: String,
    pub values: Vec<String>,
}

/// Which value of which option (both by text) a new variant picks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionSelection {
    pub option: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewVariant {
    pub sku: String,
    pub price: i64,
    pub quantity: i64,
    pub selections: Vec<OptionSelection>,
    /// Display orders of images to allocate for this variant.
    pub image_orders: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateProduct {
    pub name: String,
    pub description: String,
    pub category_id: CategoryId,
    pub attribute_ids: Vec<AttributeId>,
    pub attribute_value_ids: Vec<AttributeValueId>,
    pub options: Vec<NewOption>,
    pub variants: Vec<NewVariant>,
    pub image_orders: Vec<u32>,
}

/// Partial update; empty strings and `None` keep the current value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UpdateProduct {
    pub name: String,
    pub description: String,
    pub category_id: Option<CategoryId>,
}

pub struct CatalogService<P, C> {
    products: P,
    categories: C,
    config: CatalogConfig,
}

impl<P, C> CatalogService<P, C>
where
    P: ProductRepository,
    C: CategoryRepository,
{
    pub fn new(products: P, categories: C, config: CatalogConfig) -> Self {
        Self {
            products,
            categories,
            config,
        }
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    pub fn create_category(
        &self,
        name: &str,
        description: &str,
        parent_id: Option<CategoryId>,
    ) -> CatalogResult<Category> {
        if let Some(parent_id) = parent_id {
            self.ensure_category(parent_id)?;
        }
        let category = Category::new(name, description, parent_id);
        category.validate().map_err(DomainError::from)?;
        self.categories.create(&category)?;

        tracing::info!("created category {} ({})", category.id(), category.name());
        Ok(category)
    }

    pub fn list_categories(&self) -> CatalogResult<Vec<Category>> {
        let categories = self.categories.list()?;
        Ok(categories.into_iter().filter(|c| !c.is_removed()).collect())
    }

    fn ensure_category(&self, id: CategoryId) -> CatalogResult<()> {
        match self.categories.get(id) {
            Ok(category) if !category.is_removed() => Ok(()),
            Ok(_) | Err(RepositoryError::NotFound) => Err(CatalogError::UnknownCategory(id)),
            Err(e) => Err(e.into()),
        }
    }

    fn allocate_images(&self, product_id: ProductId, orders: &[u32]) -> Vec<ProductImage> {
        orders
            .iter()
            .map(|order| {
                ProductImage::new(*order, |image_id| self.config.image_url(product_id, image_id))
            })
            .collect()
    }

    /// Build a product with its initial options, variants and images, validate
    /// it as a whole, and persist it.
    pub fn create_product(&self, cmd: CreateProduct) -> CatalogResult<Product> {
        self.ensure_category(cmd.category_id)?;

        let mut product = Product::new(cmd.name, cmd.description, cmd.category_id);
        let product_id = *product.id();
        product.add_attribute_ids(cmd.attribute_ids);
        product.add_attribute_value_ids(cmd.attribute_value_ids);

        product.add_options(cmd.options.into_iter().map(|new_option| {
            let mut option = ProductOption::new(new_option.name);
            option.add_option_values(OptionValue::create_values(&new_option.values));
            option
        }));

        let mut violations = Validator::new();
        for (idx, new_variant) in cmd.variants.iter().enumerate() {
            let variant = self.build_variant(&product, new_variant, idx, &mut violations);
            product.add_variants([variant]);
        }

        let images = self.allocate_images(product_id, &cmd.image_orders);
        product.add_images(images);

        product.update_min_price();
        violations.merge(product.validate());
        violations.finish().map_err(DomainError::from)?;
        self.products.create(&product)?;

        tracing::info!(
            "created product {} with {} option(s) and {} variant(s)",
            product_id,
            product.options().len(),
            product.variants().len()
        );
        Ok(product)
    }

    /// Resolve text selections against the product's options and copy the
    /// chosen values onto a new variant. Unknown selections are recorded in
    /// `errors`.
    fn build_variant(
        &self,
        product: &Product,
        new_variant: &NewVariant,
        idx: usize,
        errors: &mut Validator,
    ) -> ProductVariant {
        let mut variant =
            ProductVariant::new(&new_variant.sku, new_variant.price, new_variant.quantity);
        for (sel_idx, selection) in new_variant.selections.iter().enumerate() {
            let picked = product
                .options()
                .iter()
                .find(|option| option.name() == selection.option)
                .and_then(|option| option.values().iter().find(|v| v.value() == selection.value));
            errors.check(
                &format!("variants[{idx}].selections[{sel_idx}]"),
                "known_option_value",
                picked.is_some(),
                format!("no option `{}` with value `{}`", selection.option, selection.value),
            );
            if let Some(value) = picked {
                variant.add_option_values([value.clone()]);
            }
        }
        let images = self.allocate_images(*product.id(), &new_variant.image_orders);
        variant.add_images(images);
        variant
    }

    pub fn get_product(&self, id: ProductId) -> CatalogResult<Product> {
        let product = self.products.get(id)?;
        if product.is_removed() {
            return Err(CatalogError::ProductRemoved(id));
        }
        Ok(product)
    }

    /// Listing with the page size clamped by configuration.
    pub fn list_products(
        &self,
        filter: &ProductFilter,
        offset: usize,
        limit: Option<usize>,
    ) -> CatalogResult<ProductPage> {
        let page = self.config.page(offset, limit);
        tracing::debug!("listing products: {filter:?} {page:?}");
        Ok(self.products.list(filter, page)?)
    }

    /// Load → mutate → reprice → validate → persist.
    ///
    /// `mutate` may record violations of its own; they are reported together
    /// with the aggregate's validation.
    fn modify<F>(&self, id: ProductId, operation: &str, mutate: F) -> CatalogResult<Product>
    where
        F: FnOnce(&mut Product, &mut Validator) -> CatalogResult<()>,
    {
        let mut product = self.get_product(id)?;
        let mut violations = Validator::new();
        mutate(&mut product, &mut violations)?;
        product.update_min_price();

        violations.merge(product.validate());
        if let Err(errors) = violations.finish() {
            tracing::warn!("{operation} on product {id} rejected: {errors}");
            return Err(DomainError::from(errors).into());
        }
        self.products.update(&product)?;

        tracing::info!("{operation} applied to product {id}");
        Ok(product)
    }

    pub fn update_product(&self, id: ProductId, cmd: UpdateProduct) -> CatalogResult<Product> {
        if let Some(category_id) = cmd.category_id.filter(|c| !c.is_nil()) {
            self.ensure_category(category_id)?;
        }
        self.modify(id, "update_product", |product, _| {
            product.update(&cmd.name, &cmd.description, cmd.category_id);
            Ok(())
        })
    }

    /// Add a variant picking values by text from the product's existing options.
    pub fn add_variant(&self, id: ProductId, new_variant: NewVariant) -> CatalogResult<Product> {
        self.modify(id, "add_variant", |product, violations| {
            let index = product.variants().len();
            let variant = self.build_variant(product, &new_variant, index, violations);
            product.add_variants([variant]);
            Ok(())
        })
    }

    pub fn update_variant(
        &self,
        id: ProductId,
        variant_id: VariantId,
        price: i64,
        quantity: i64,
    ) -> CatalogResult<Product> {
        self.modify(id, "update_variant", |product, _| {
            Ok(product.update_variant(variant_id, price, quantity)?)
        })
    }

    pub fn update_option(
        &self,
        id: ProductId,
        option_id: OptionId,
        name: &str,
    ) -> CatalogResult<Product> {
        self.modify(id, "update_option", |product, _| {
            Ok(product.update_option(option_id, name)?)
        })
    }

    pub fn update_option_value(
        &self,
        id: ProductId,
        option_id: OptionId,
        value_id: OptionValueId,
        value: &str,
    ) -> CatalogResult<Product> {
        self.modify(id, "update_option_value", |product, _| {
            Ok(product.update_option_value(option_id, value_id, value)?)
        })
    }

    /// Allocate product-level images and return their ids for upload.
    pub fn add_images(&self, id: ProductId, orders: &[u32]) -> CatalogResult<Vec<ImageId>> {
        let images = self.allocate_images(id, orders);
        let image_ids: Vec<ImageId> = images.iter().map(|image| *image.id()).collect();
        self.modify(id, "add_images", |product, _| {
            product.add_images(images);
            Ok(())
        })?;
        Ok(image_ids)
    }

    pub fn add_variant_images(
        &self,
        id: ProductId,
        variant_id: VariantId,
        orders: &[u32],
    ) -> CatalogResult<Vec<ImageId>> {
        let images = self.allocate_images(id, orders);
        let image_ids: Vec<ImageId> = images.iter().map(|image| *image.id()).collect();
        self.modify(id, "add_variant_images", |product, _| {
            Ok(product.add_variant_images(variant_id, images)?)
        })?;
        Ok(image_ids)
    }

    pub fn record_purchase(
        &self,
        id: ProductId,
        variant_id: VariantId,
        quantity: i64,
    ) -> CatalogResult<Product> {
        self.modify(id, "record_purchase", |product, _| {
            Ok(product.record_purchase(variant_id, quantity)?)
        })
    }

    /// Soft-delete a product and everything it owns.
    pub fn remove_product(&self, id: ProductId) -> CatalogResult<()> {
        self.get_product(id)?;
        self.products.soft_delete(id)?;
        tracing::info!("removed product {id}");
        Ok(())
    }
}
