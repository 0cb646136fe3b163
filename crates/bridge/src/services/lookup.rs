//! Storefront URL resolution in both directions.

use std::sync::Arc;

use commerce_bridge_core::{CategoryId, ContentId, EntityKind, LookupId, ProductId, UrlLookup};
use graphql_client::QueryBody;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use super::{CategoryService, ContentService, ProductService};
use crate::upstream::{Transport, UpstreamError};

/// Resolves a storefront path to the category or product it renders.
const ROUTE_QUERY: &str = r"
query LookupRoute($path: String!) {
  site {
    route(path: $path) {
      node {
        __typename
        ... on Category { entityId }
        ... on Product { entityId }
      }
    }
  }
}
";

#[derive(Debug, Default, Deserialize)]
struct RouteData {
    #[serde(default)]
    site: Option<Site>,
}

#[derive(Debug, Deserialize)]
struct Site {
    #[serde(default)]
    route: Option<Route>,
}

#[derive(Debug, Deserialize)]
struct Route {
    #[serde(default)]
    node: Option<RouteNode>,
}

#[derive(Debug, Deserialize)]
struct RouteNode {
    #[serde(rename = "__typename")]
    typename: String,
    #[serde(rename = "entityId", default)]
    entity_id: Option<i64>,
}

impl RouteData {
    fn into_lookup(self) -> Option<UrlLookup> {
        let node = self.site?.route?.node?;
        let kind = EntityKind::from_typename(&node.typename)?;
        Some(UrlLookup {
            id: LookupId::Numeric(node.entity_id?),
            kind,
        })
    }
}

pub struct LookupService<T> {
    transport: Arc<T>,
    categories: Arc<CategoryService<T>>,
    products: Arc<ProductService<T>>,
    content: Arc<ContentService<T>>,
}

impl<T: Transport> LookupService<T> {
    pub const fn new(
        transport: Arc<T>,
        categories: Arc<CategoryService<T>>,
        products: Arc<ProductService<T>>,
        content: Arc<ContentService<T>>,
    ) -> Self {
        Self {
            transport,
            categories,
            products,
            content,
        }
    }

    /// The entity rendered at a storefront path.
    ///
    /// Categories and products are resolved through the storefront route;
    /// anything else is looked up among content pages. An empty path never
    /// resolves.
    ///
    /// # Errors
    ///
    /// Returns the upstream failure of either lookup.
    #[instrument(skip(self))]
    pub async fn resolve_url(&self, url: &str) -> Result<Option<UrlLookup>, UpstreamError> {
        if url.is_empty() {
            return Ok(None);
        }

        let body = QueryBody {
            variables: json!({ "path": url }),
            query: ROUTE_QUERY,
            operation_name: "LookupRoute",
        };
        tracing::debug!(url, "Resolving storefront route");
        let response = self.transport.graphql(&body).await?;

        let route: RouteData = if response.body.is_null() {
            RouteData::default()
        } else {
            serde_json::from_value(response.body)?
        };

        if let Some(lookup) = route.into_lookup() {
            return Ok(Some(lookup));
        }

        self.content.lookup(url).await
    }

    /// Storefront path of an entity of the given kind.
    ///
    /// # Errors
    ///
    /// Returns the upstream failure of the underlying URL lookup.
    #[instrument(skip(self))]
    pub async fn storefront_url(&self, kind: EntityKind, id: i64) -> Result<Option<String>, UpstreamError> {
        match kind {
            EntityKind::Category => self.categories.url(CategoryId::new(id)).await,
            EntityKind::Product => self.products.url(ProductId::new(id)).await,
            EntityKind::Content => self.content.url(ContentId::new(id)).await,
        }
    }
}

/// Serialized form of an optional lookup: the lookup itself or `{}`.
#[must_use]
pub fn lookup_body(lookup: Option<&UrlLookup>) -> Value {
    lookup.map_or_else(|| json!({}), |lookup| json!(lookup))
}
