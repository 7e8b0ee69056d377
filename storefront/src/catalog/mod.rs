pub mod catalog_store;
pub mod product_models;

pub use catalog_store::{CatalogError, CatalogStore, ProductSource, StaticProductSource, PRODUCTS_TAG};
pub use product_models::{default_products, Product};
