use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::RwLock;

use storefront_catalog::{
    Category, CategoryRepository, Page, Product, ProductFilter, ProductPage, ProductRepository,
    ProductSort, RepositoryError,
};
use storefront_core::{AggregateRoot, CategoryId, Entity, ProductId};

/// In-memory aggregate store keyed by aggregate id.
///
/// Intended for tests/dev. Hands out clones, so callers never share a live
/// aggregate across requests.
#[derive(Debug)]
pub struct InMemoryStore<A: AggregateRoot> {
    records: RwLock<HashMap<A::Id, A>>,
}

impl<A: AggregateRoot> Default for InMemoryStore<A> {
    fn default() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
        }
    }
}

fn poisoned<T>(_: T) -> RepositoryError {
    RepositoryError::Storage("lock poisoned".to_string())
}

impl<A> InMemoryStore<A>
where
    A: AggregateRoot + Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &A::Id) -> Result<A, RepositoryError> {
        let records = self.records.read().map_err(poisoned)?;
        records.get(id).cloned().ok_or(RepositoryError::NotFound)
    }

    pub fn insert(&self, aggregate: &A) -> Result<(), RepositoryError> {
        let mut records = self.records.write().map_err(poisoned)?;
        if records.contains_key(aggregate.id()) {
            return Err(RepositoryError::Duplicated);
        }
        records.insert(*aggregate.id(), aggregate.clone());
        Ok(())
    }

    pub fn replace(&self, aggregate: &A) -> Result<(), RepositoryError> {
        let mut records = self.records.write().map_err(poisoned)?;
        let slot = records
            .get_mut(aggregate.id())
            .ok_or(RepositoryError::NotFound)?;
        *slot = aggregate.clone();
        Ok(())
    }

    /// Mutate a stored aggregate in place under the write lock.
    pub fn modify(&self, id: &A::Id, f: impl FnOnce(&mut A)) -> Result<(), RepositoryError> {
        let mut records = self.records.write().map_err(poisoned)?;
        let slot = records.get_mut(id).ok_or(RepositoryError::NotFound)?;
        f(slot);
        Ok(())
    }

    pub fn all(&self) -> Result<Vec<A>, RepositoryError> {
        let records = self.records.read().map_err(poisoned)?;
        Ok(records.values().cloned().collect())
    }
}

#[derive(Debug, Default)]
pub struct InMemoryProductRepository {
    store: InMemoryStore<Product>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn sort_products(products: &mut [Product], sort: ProductSort) {
    match sort {
        ProductSort::Newest => products.sort_by_key(|p| Reverse(*p.id())),
        ProductSort::PriceAsc => products.sort_by_key(|p| (p.price(), *p.id())),
        ProductSort::PriceDesc => products.sort_by_key(|p| (Reverse(p.price()), *p.id())),
        ProductSort::Trending => products.sort_by(|a, b| {
            b.trending_score()
                .total_cmp(&a.trending_score())
                .then_with(|| b.id().cmp(a.id()))
        }),
    }
}

impl ProductRepository for InMemoryProductRepository {
    fn get(&self, id: ProductId) -> Result<Product, RepositoryError> {
        self.store.get(&id)
    }

    fn list(&self, filter: &ProductFilter, page: Page) -> Result<ProductPage, RepositoryError> {
        let mut matches: Vec<Product> = self
            .store
            .all()?
            .into_iter()
            .filter(|p| filter.matches(p))
            .collect();
        sort_products(&mut matches, filter.sort);

        let total = matches.len();
        let items = matches
            .into_iter()
            .skip(page.offset)
            .take(page.limit)
            .collect();
        Ok(ProductPage { items, total })
    }

    fn create(&self, product: &Product) -> Result<(), RepositoryError> {
        self.store.insert(product)
    }

    fn update(&self, product: &Product) -> Result<(), RepositoryError> {
        self.store.replace(product)
    }

    fn soft_delete(&self, id: ProductId) -> Result<(), RepositoryError> {
        self.store.modify(&id, Product::remove)
    }
}

#[derive(Debug, Default)]
pub struct InMemoryCategoryRepository {
    store: InMemoryStore<Category>,
}

impl InMemoryCategoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CategoryRepository for InMemoryCategoryRepository {
    fn get(&self, id: CategoryId) -> Result<Category, RepositoryError> {
        self.store.get(&id)
    }

    fn list(&self) -> Result<Vec<Category>, RepositoryError> {
        let mut categories = self.store.all()?;
        categories.sort_by_key(|c| *c.id());
        Ok(categories)
    }

    fn create(&self, category: &Category) -> Result<(), RepositoryError> {
        self.store.insert(category)
    }

    fn update(&self, category: &Category) -> Result<(), RepositoryError> {
        self.store.replace(category)
    }
}
