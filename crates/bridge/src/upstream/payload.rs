//! Shapes shared by upstream REST payloads.

use serde::Deserialize;

/// Standard `{data, meta}` envelope of management API responses.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub data: T,
    #[serde(default)]
    pub meta: Meta,
}

#[derive(Debug, Default, Deserialize)]
pub struct Meta {
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

/// Pagination metadata of a listing response.
///
/// Upstream may send an empty object; every field defaults to zero, which
/// reads as "this is the last page".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub per_page: u64,
    #[serde(default)]
    pub current_page: u32,
    #[serde(default)]
    pub total_pages: u32,
}

impl Pagination {
    /// Whether pages remain after the current one.
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }
}

impl Meta {
    /// Whether the listing continues past this response.
    #[must_use]
    pub fn has_next(&self) -> bool {
        self.pagination.as_ref().is_some_and(Pagination::has_next)
    }
}

/// Storefront URL attached to categories and products.
#[derive(Debug, Clone, Deserialize)]
pub struct CustomUrl {
    pub url: String,
}
