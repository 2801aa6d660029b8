use tracing::info;

use super::models::Catalog;

/// Authoritative catalog for the session. Only ever replaced whole.
#[derive(Debug, Default)]
pub struct CatalogStore {
    catalog: Catalog,
    revision: u64,
}

impl CatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Bumped on every replacement; lets a slow response detect that newer
    /// data already landed.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn replace(&mut self, catalog: Catalog) {
        self.revision += 1;
        info!(
            items = catalog.len(),
            previous = self.catalog.len(),
            revision = self.revision,
            "Catalog replaced"
        );
        self.catalog = catalog;
    }
}
