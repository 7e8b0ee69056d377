use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::catalog::{default_products, CatalogError, Product, ProductSource};
use crate::flags::{FlagCodec, PRECOMPUTE_FLAGS};
use crate::overrides::OverrideCipher;

/// Serves the default catalog and counts how often it was asked to.
#[derive(Default)]
pub struct CountingProductSource {
    loads: AtomicUsize,
}

impl CountingProductSource {
    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProductSource for CountingProductSource {
    async fn load_products(&self) -> Result<Vec<Product>, CatalogError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        Ok(default_products())
    }
}

/// A source that always fails, for exercising error paths.
pub struct UnavailableProductSource;

#[async_trait]
impl ProductSource for UnavailableProductSource {
    async fn load_products(&self) -> Result<Vec<Product>, CatalogError> {
        Err(CatalogError::SourceUnavailable(
            "catalog backend is down".to_string(),
        ))
    }
}

/// Cookie value carrying `overrides`, as the server would have set it.
pub fn override_cookie_value(secret: &str, overrides: Value) -> String {
    let map: Map<String, Value> = overrides.as_object().cloned().unwrap_or_default();
    OverrideCipher::new(secret).encrypt(&map).unwrap_or_default()
}

/// The flag code the rewriter produces for `values` in precompute order.
pub fn flag_code(secret: &str, values: &[bool]) -> String {
    FlagCodec::new(secret)
        .serialize(&PRECOMPUTE_FLAGS, values)
        .unwrap_or_default()
}
