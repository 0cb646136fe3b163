//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::BridgeConfig;
use crate::services::{CategoryService, ContentService, LookupService, ProductService};
use crate::upstream::UpstreamClient;
use crate::validation::DetailHeuristic;

/// Application state shared across all handlers.
///
/// This is wrapped in an `Arc` internally, so cloning is cheap. The upstream
/// client owns the storefront token; the category and content services own
/// their resolution caches. All of them live for the whole process.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: BridgeConfig,
    client: Arc<UpstreamClient>,
    categories: Arc<CategoryService<UpstreamClient>>,
    products: Arc<ProductService<UpstreamClient>>,
    content: Arc<ContentService<UpstreamClient>>,
    lookup: LookupService<UpstreamClient>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the upstream HTTP client cannot be built.
    pub fn new(config: BridgeConfig) -> Result<Self, reqwest::Error> {
        let client = Arc::new(UpstreamClient::new(&config.upstream)?);

        let categories = Arc::new(CategoryService::new(Arc::clone(&client)));
        let products = Arc::new(ProductService::new(Arc::clone(&client)));
        let content = Arc::new(ContentService::new(
            Arc::clone(&client),
            Arc::new(DetailHeuristic),
        ));
        let lookup = LookupService::new(
            Arc::clone(&client),
            Arc::clone(&categories),
            Arc::clone(&products),
            Arc::clone(&content),
        );

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                client,
                categories,
                products,
                content,
                lookup,
            }),
        })
    }

    /// Get a reference to the configuration.
    #[must_use]
    pub fn config(&self) -> &BridgeConfig {
        &self.inner.config
    }

    /// Get a reference to the upstream client.
    #[must_use]
    pub fn client(&self) -> &UpstreamClient {
        &self.inner.client
    }

    #[must_use]
    pub fn categories(&self) -> &CategoryService<UpstreamClient> {
        &self.inner.categories
    }

    #[must_use]
    pub fn products(&self) -> &ProductService<UpstreamClient> {
        &self.inner.products
    }

    #[must_use]
    pub fn content(&self) -> &ContentService<UpstreamClient> {
        &self.inner.content
    }

    #[must_use]
    pub fn lookup(&self) -> &LookupService<UpstreamClient> {
        &self.inner.lookup
    }
}
