//! URL lookup results.
//!
//! The bridge host identifies storefront pages either by an upstream entity id
//! or, for the homepage, by the path `/` itself.

use serde::{Deserialize, Serialize};

/// Kind of storefront entity a URL resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Category,
    Product,
    Content,
}

impl EntityKind {
    /// Map a GraphQL `__typename` to an entity kind.
    ///
    /// Matching is case-insensitive; unknown type names return `None`.
    #[must_use]
    pub fn from_typename(typename: &str) -> Option<Self> {
        match typename.to_lowercase().as_str() {
            "category" => Some(Self::Category),
            "product" => Some(Self::Product),
            "content" => Some(Self::Content),
            _ => None,
        }
    }

    /// Parse the `type` parameter of a storefront URL request.
    ///
    /// Anything that is not a category or product is treated as content.
    #[must_use]
    pub fn from_param(value: &str) -> Self {
        match value {
            "category" => Self::Category,
            "product" => Self::Product,
            _ => Self::Content,
        }
    }
}

/// Identifier part of a [`UrlLookup`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LookupId {
    /// Upstream numeric entity id.
    Numeric(i64),
    /// Synthetic path identifier (the homepage `/`).
    Path(String),
}

/// The entity a storefront URL resolves to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlLookup {
    pub id: LookupId,
    #[serde(rename = "type")]
    pub kind: EntityKind,
}
