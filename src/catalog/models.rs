//! Catalog entries as returned by the catalog service.
//!
//! Wire shape of one entry:
//!
//! ```json
//! {
//!   "name": "Product Based on a red ceramic mug...",
//!   "description": "a red ceramic mug on a wooden table",
//!   "image_url": "/static/mug.jpg",
//!   "specifications": { "Material": "Synthetic", "Color": "Varied" }
//! }
//! ```
//!
//! Items only come from the service, so there is no public constructor;
//! they are built by deserializing a response body.

use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub type Specifications = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CatalogItem {
    name: String,
    description: String,
    image_url: String,
    specifications: Specifications,
}

impl CatalogItem {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn image_url(&self) -> &str {
        &self.image_url
    }

    pub fn specifications(&self) -> &Specifications {
        &self.specifications
    }

    /// The service returns paths like `/static/x.jpg`; join them onto the
    /// service base. Absolute URLs pass through unchanged.
    pub fn resolved_image_url(&self, base: &Url) -> String {
        base.join(&self.image_url)
            .map(String::from)
            .unwrap_or_else(|_| self.image_url.clone())
    }
}

/// Ordered list of catalog items
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Catalog {
    items: Vec<CatalogItem>,
}

impl Catalog {
    pub fn items(&self) -> &[CatalogItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.items.iter().map(CatalogItem::name).collect()
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a CatalogItem;
    type IntoIter = std::slice::Iter<'a, CatalogItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
