//! Catalog data returned by the service and the store that holds it

pub mod models;
pub mod store;

pub use models::{Catalog, CatalogItem, Specifications};
pub use store::CatalogStore;
