//! Catalog records: categories and products.
//!
//! These are the normalized shapes produced from upstream catalog payloads.
//! Field names follow the bridge host's vocabulary (`label`, `extract`), not
//! the upstream's (`name`, `sku`).

use serde::{Deserialize, Serialize};

use super::id::{CategoryId, ProductId};

/// A single category as listed by the upstream catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRecord {
    /// Upstream-assigned identifier.
    pub id: CategoryId,
    /// Parent category, [`CategoryId::ROOT`] for top-level categories.
    pub parent_id: CategoryId,
    /// Display name.
    pub label: String,
    /// Position among siblings (ascending).
    pub sort_order: i64,
    /// Storefront path of the category.
    pub url: String,
}

/// A category within the nested category tree.
///
/// `children` is omitted from the serialized form for leaves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryNode {
    pub id: CategoryId,
    pub label: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Self>,
}

impl CategoryNode {
    /// Whether this node has no children.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// A category entry in a flattened category listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySummary {
    pub id: CategoryId,
    pub label: String,
}

impl From<&CategoryNode> for CategorySummary {
    fn from(node: &CategoryNode) -> Self {
        Self {
            id: node.id,
            label: node.label.clone(),
        }
    }
}

/// A product as shown to the bridge host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub id: ProductId,
    /// Product name.
    pub label: String,
    /// Product SKU.
    pub extract: String,
    /// Thumbnail image URL of the primary image (empty when missing).
    pub thumbnail: String,
    /// Standard image URL of the primary image (empty when missing).
    pub image: String,
}
