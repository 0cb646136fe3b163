//! Product listings and product URL resolution.
//!
//! Unlike categories, products are paginated upstream; the bridge passes the
//! requested page through and reports upstream's pagination metadata.

use std::sync::Arc;

use commerce_bridge_core::{CategoryId, PageResult, ProductId, ProductRecord};
use serde::Deserialize;
use tracing::instrument;

use crate::upstream::payload::{CustomUrl, Envelope};
use crate::upstream::{Transport, UpstreamError, query_string};

const PRODUCTS_PATH: &str = "/v3/catalog/products";

#[derive(Debug, Deserialize)]
struct UpstreamProduct {
    id: i64,
    name: String,
    #[serde(default)]
    sku: String,
    #[serde(default)]
    primary_image: Option<PrimaryImage>,
}

#[derive(Debug, Default, Deserialize)]
struct PrimaryImage {
    #[serde(default)]
    url_thumbnail: String,
    #[serde(default)]
    url_standard: String,
}

impl From<UpstreamProduct> for ProductRecord {
    fn from(product: UpstreamProduct) -> Self {
        let image = product.primary_image.unwrap_or_default();
        Self {
            id: ProductId::new(product.id),
            label: product.name,
            extract: product.sku,
            thumbnail: image.url_thumbnail,
            image: image.url_standard,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ProductUrl {
    #[serde(default)]
    custom_url: Option<CustomUrl>,
}

/// Filters for the product listing.
#[derive(Debug, Clone, Default)]
pub struct ProductQuery {
    pub category_id: Option<CategoryId>,
    pub keyword: Option<String>,
    /// 1-based page number; defaults to the first page.
    pub page: Option<u32>,
}

pub struct ProductService<T> {
    transport: Arc<T>,
}

impl<T: Transport> ProductService<T> {
    pub const fn new(transport: Arc<T>) -> Self {
        Self { transport }
    }

    /// One upstream page of products.
    ///
    /// # Errors
    ///
    /// Returns the upstream failure.
    #[instrument(skip(self))]
    pub async fn list(&self, query: ProductQuery) -> Result<PageResult<ProductRecord>, UpstreamError> {
        let page = query.page.unwrap_or(1).to_string();
        let category = query
            .category_id
            .filter(|id| *id != CategoryId::ROOT)
            .map(|id| id.to_string());

        let mut pairs = vec![
            ("page", page.as_str()),
            ("include_fields", "name,sku"),
            ("include", "primary_image"),
        ];
        if let Some(keyword) = query.keyword.as_deref().filter(|k| !k.is_empty()) {
            pairs.push(("keyword", keyword));
        }
        if let Some(category) = category.as_deref() {
            pairs.push(("categories:in", category));
        }

        let path = format!("{PRODUCTS_PATH}?{}", query_string(pairs));
        tracing::debug!(path = %path, "Fetching products");

        let envelope: Envelope<Vec<UpstreamProduct>> = self.transport.get(&path).await?.json()?;
        let pagination = envelope.meta.pagination.unwrap_or_default();

        Ok(PageResult {
            items: envelope.data.into_iter().map(ProductRecord::from).collect(),
            total: usize::try_from(pagination.total).unwrap_or(usize::MAX),
            has_next: pagination.has_next(),
        })
    }

    /// Products with the given ids, taken from the first listing page.
    ///
    /// # Errors
    ///
    /// Returns the upstream failure.
    #[instrument(skip(self))]
    pub async fn by_ids(&self, ids: &[ProductId]) -> Result<PageResult<ProductRecord>, UpstreamError> {
        let page = self.list(ProductQuery::default()).await?;
        Ok(page.retain(|product| ids.contains(&product.id)))
    }

    /// Storefront path of a product, `None` if upstream has no such product.
    ///
    /// # Errors
    ///
    /// Returns upstream failures other than "not found".
    #[instrument(skip(self))]
    pub async fn url(&self, id: ProductId) -> Result<Option<String>, UpstreamError> {
        let path = format!(
            "{PRODUCTS_PATH}/{id}?{}",
            query_string([("include_fields", "custom_url")])
        );
        tracing::debug!(path = %path, "Fetching product URL");

        let product: Envelope<ProductUrl> = match self.transport.get(&path).await {
            Ok(response) => response.json()?,
            Err(err) if err.is_not_found() => return Ok(None),
            Err(err) => return Err(err),
        };

        Ok(product
            .data
            .custom_url
            .map(|custom| custom.url)
            .filter(|url| !url.is_empty()))
    }
}
