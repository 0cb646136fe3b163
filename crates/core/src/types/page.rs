//! Paginated listing results.

use serde::Serialize;

/// One page of a listing, together with the size of the whole listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResult<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub has_next: bool,
}

impl<T> PageResult<T> {
    /// A complete, single-page result.
    #[must_use]
    pub fn complete(items: Vec<T>) -> Self {
        Self {
            total: items.len(),
            items,
            has_next: false,
        }
    }

    /// Keep only the items matching `keep`; `total` follows the kept items
    /// and `has_next` is cleared.
    #[must_use]
    pub fn retain(self, mut keep: impl FnMut(&T) -> bool) -> Self {
        Self::complete(self.items.into_iter().filter(|item| keep(item)).collect())
    }
}
