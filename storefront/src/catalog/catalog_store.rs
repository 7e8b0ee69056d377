use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::instrument;

use crate::cache::{CacheSource, TaggedCache};
use crate::catalog::product_models::{default_products, Product};

/// Tag attached to every catalog read; revalidating it reloads the catalog.
pub const PRODUCTS_TAG: &str = "products";

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("product source unavailable: {0}")]
    SourceUnavailable(String),
}

/// Where products come from. The shop ships a static list, but anything
/// behind this trait gets the same caching and revalidation.
#[async_trait]
pub trait ProductSource {
    async fn load_products(&self) -> Result<Vec<Product>, CatalogError>;
}

pub struct StaticProductSource {
    products: Vec<Product>,
}

impl StaticProductSource {
    pub fn new(products: Vec<Product>) -> Self {
        StaticProductSource { products }
    }
}

impl Default for StaticProductSource {
    fn default() -> Self {
        Self::new(default_products())
    }
}

#[async_trait]
impl ProductSource for StaticProductSource {
    async fn load_products(&self) -> Result<Vec<Product>, CatalogError> {
        Ok(self.products.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum CatalogKey {
    List,
    ById(String),
}

#[derive(Debug, Clone)]
enum CatalogEntry {
    List(Arc<Vec<Product>>),
    Product(Option<Product>),
}

#[derive(Clone)]
pub struct CatalogStore {
    source: Arc<dyn ProductSource + Send + Sync>,
    cache: TaggedCache<CatalogKey, CatalogEntry>,
}

impl CatalogStore {
    pub fn new(source: Arc<dyn ProductSource + Send + Sync>, max_capacity: u64) -> Self {
        CatalogStore {
            source,
            cache: TaggedCache::new("catalog", max_capacity, None),
        }
    }

    /// All products, in catalog order.
    #[instrument(skip_all)]
    pub async fn list(&self) -> Result<Arc<Vec<Product>>, Arc<CatalogError>> {
        let source = self.source.clone();
        let (entry, cache_source) = self
            .cache
            .get_or_try_load(CatalogKey::List, &[PRODUCTS_TAG], async move {
                let products = source.load_products().await?;
                Ok::<_, CatalogError>(CatalogEntry::List(Arc::new(products)))
            })
            .await?;
        tracing::debug!(source = ?cache_source, "listed products");

        match entry {
            CatalogEntry::List(products) => Ok(products),
            CatalogEntry::Product(_) => Err(Arc::new(CatalogError::SourceUnavailable(
                "catalog list entry holds a single product".to_string(),
            ))),
        }
    }

    /// The product with `id`, or `None` when the catalog has no such product.
    /// Misses are cached too, so unknown ids do not hit the source repeatedly.
    #[instrument(skip(self))]
    pub async fn get_by_id(&self, id: &str) -> Result<Option<Product>, Arc<CatalogError>> {
        let source = self.source.clone();
        let wanted = id.to_string();
        let (entry, cache_source): (CatalogEntry, CacheSource) = self
            .cache
            .get_or_try_load(CatalogKey::ById(id.to_string()), &[PRODUCTS_TAG], async move {
                let products = source.load_products().await?;
                let product = products.into_iter().find(|product| product.id == wanted);
                Ok::<_, CatalogError>(CatalogEntry::Product(product))
            })
            .await?;
        tracing::debug!(source = ?cache_source, "looked up product");

        match entry {
            CatalogEntry::Product(product) => Ok(product),
            CatalogEntry::List(_) => Err(Arc::new(CatalogError::SourceUnavailable(
                "catalog product entry holds a list".to_string(),
            ))),
        }
    }

    pub fn invalidate_tag(&self, tag: &str) -> Result<(), moka::PredicateError> {
        self.cache.invalidate_tag(tag)
    }
}
