//! Category listings, the category tree and category URL resolution.
//!
//! The upstream catalog is always fetched in full (all pages of 250) and
//! shaped locally: tree assembly, keyword filtering and pagination happen in
//! the bridge, not upstream.

use std::collections::HashMap;
use std::sync::Arc;

use commerce_bridge_core::{CategoryId, CategoryNode, CategoryRecord, CategorySummary, PageResult};
use serde::Deserialize;
use tracing::instrument;

use super::category_tree::{build_tree, dedup_by_id, filter_by_keyword, flatten, paginate};
use crate::cache::ResolutionCache;
use crate::upstream::payload::CustomUrl;
use crate::upstream::{PageCursor, Transport, UpstreamError};

/// Entries per page of the flat category listing.
pub const PAGE_SIZE: usize = 50;

const CATEGORIES_PATH: &str = "/v3/catalog/categories";
const INCLUDE_FIELDS: &str = "id,parent_id,name,sort_order,custom_url";
const UPSTREAM_LIMIT: &str = "250";

/// Category id to storefront path.
pub type CategoryUrls = HashMap<CategoryId, String>;

#[derive(Debug, Deserialize)]
struct UpstreamCategory {
    id: i64,
    #[serde(default)]
    parent_id: i64,
    name: String,
    #[serde(default)]
    sort_order: i64,
    custom_url: Option<CustomUrl>,
}

impl From<UpstreamCategory> for CategoryRecord {
    fn from(category: UpstreamCategory) -> Self {
        Self {
            id: CategoryId::new(category.id),
            parent_id: CategoryId::new(category.parent_id),
            label: category.name,
            sort_order: category.sort_order,
            url: category.custom_url.map(|c| c.url).unwrap_or_default(),
        }
    }
}

/// Filters for the flat category listing.
#[derive(Debug, Clone, Default)]
pub struct CategoryQuery {
    /// Restrict the listing to the subtree below this category.
    pub parent_id: Option<CategoryId>,
    /// Case-insensitive label filter.
    pub keyword: Option<String>,
    /// 1-based page number; defaults to the first page.
    pub page: Option<u32>,
}

pub struct CategoryService<T> {
    transport: Arc<T>,
    urls: ResolutionCache<CategoryUrls>,
}

impl<T: Transport> CategoryService<T> {
    pub fn new(transport: Arc<T>) -> Self {
        Self {
            transport,
            urls: ResolutionCache::new("category_urls"),
        }
    }

    /// All categories, de-duplicated by id (first occurrence wins).
    async fn load_records(&self) -> Result<Vec<CategoryRecord>, UpstreamError> {
        let cursor = PageCursor::new(
            &*self.transport,
            CATEGORIES_PATH,
            &[("include_fields", INCLUDE_FIELDS), ("limit", UPSTREAM_LIMIT)],
        );
        let categories: Vec<UpstreamCategory> = cursor.collect_all().await?;
        Ok(dedup_by_id(categories.into_iter().map(CategoryRecord::from)))
    }

    /// Fetch the full catalog and refresh the URL index from it.
    async fn fetch_all(&self) -> Result<Vec<CategoryRecord>, UpstreamError> {
        let records = self.load_records().await?;
        self.urls.replace(url_index(&records)).await;
        tracing::debug!(count = records.len(), "Fetched categories");
        Ok(records)
    }

    /// Flat, pre-order category listing.
    ///
    /// # Errors
    ///
    /// Returns the upstream failure if any catalog page cannot be fetched.
    #[instrument(skip(self))]
    pub async fn list(&self, query: CategoryQuery) -> Result<PageResult<CategorySummary>, UpstreamError> {
        let records = self.fetch_all().await?;
        let tree = build_tree(&records, query.parent_id.unwrap_or(CategoryId::ROOT));

        let mut list = flatten(&tree);
        if let Some(keyword) = query.keyword.as_deref().filter(|k| !k.is_empty()) {
            list = filter_by_keyword(list, keyword);
        }

        Ok(paginate(list, query.page.unwrap_or(1), PAGE_SIZE))
    }

    /// Nested category tree below `parent_id` (root by default).
    ///
    /// `total` counts every category in the catalog, not just the subtree.
    ///
    /// # Errors
    ///
    /// Returns the upstream failure if any catalog page cannot be fetched.
    #[instrument(skip(self))]
    pub async fn tree(&self, parent_id: Option<CategoryId>) -> Result<PageResult<CategoryNode>, UpstreamError> {
        let records = self.fetch_all().await?;
        let tree = build_tree(&records, parent_id.unwrap_or(CategoryId::ROOT));

        Ok(PageResult {
            items: tree,
            total: records.len(),
            has_next: false,
        })
    }

    /// Categories with the given ids, taken from the first listing page.
    ///
    /// # Errors
    ///
    /// Returns the upstream failure if the catalog cannot be fetched.
    #[instrument(skip(self))]
    pub async fn by_ids(&self, ids: &[CategoryId]) -> Result<PageResult<CategorySummary>, UpstreamError> {
        let page = self.list(CategoryQuery::default()).await?;
        Ok(page.retain(|category| ids.contains(&category.id)))
    }

    /// Storefront path of a category, `None` for unknown ids.
    ///
    /// # Errors
    ///
    /// Returns the upstream failure if the URL index has to be loaded and
    /// loading fails.
    #[instrument(skip(self))]
    pub async fn url(&self, id: CategoryId) -> Result<Option<String>, UpstreamError> {
        let urls = self
            .urls
            .get_or_load(async { self.load_records().await.map(|records| url_index(&records)) })
            .await?;

        let url = urls.get(&id).cloned();
        if url.is_none() {
            tracing::error!(category_id = %id, "Invalid categoryId passed");
        }
        Ok(url)
    }
}

fn url_index(records: &[CategoryRecord]) -> CategoryUrls {
    records
        .iter()
        .map(|record| (record.id, record.url.clone()))
        .collect()
}
