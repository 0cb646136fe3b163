//! Content pages: listing, URL resolution and page writes.
//!
//! Pages created through the bridge get an embed code as their body, which
//! the storefront replaces with content rendered by the bridge host.

use std::collections::HashMap;
use std::sync::Arc;

use commerce_bridge_core::{ContentId, ContentPayload, ContentRecord, EntityKind, LookupId, PageResult, UrlLookup};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tracing::instrument;

use crate::cache::ResolutionCache;
use crate::upstream::payload::Envelope;
use crate::upstream::{PageCursor, Transport, UpstreamError, query_string};
use crate::validation::{FieldValidationError, WriteFailureClassifier};

const PAGES_PATH: &str = "/v3/content/pages";
const UPSTREAM_LIMIT: &str = "250";
const HOMEPAGE_PATH: &str = "/";

/// Errors from content page writes.
#[derive(Debug, Error)]
pub enum ContentError {
    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    /// Upstream rejected a field of the payload.
    #[error(transparent)]
    Validation(#[from] FieldValidationError),

    /// Upstream refused to create the page.
    #[error("{message}")]
    Rejected {
        message: String,
        #[source]
        source: UpstreamError,
    },

    /// The page exists upstream but its body could not be set.
    #[error("Content page {id} was created but its embed code could not be stored")]
    EmbedFailed {
        id: ContentId,
        #[source]
        source: UpstreamError,
    },
}

/// Markup stored as the body of bridge-managed pages.
#[must_use]
pub fn embed_code(id: ContentId) -> String {
    format!(
        r#"<code style="background-color:#eee;padding:0.2em 0.5em;border:1px solid #bbb;border-radius:3px">&lt;caas-content content="{id}" /&gt;</code>"#
    )
}

fn page_path(id: ContentId) -> String {
    format!("{PAGES_PATH}/{id}")
}

#[derive(Debug, Deserialize)]
struct UpstreamPage {
    id: i64,
    #[serde(default)]
    name: String,
    #[serde(default)]
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SiblingPage {
    #[serde(default)]
    sort_order: Option<i64>,
}

/// Page payload sent to upstream on create and update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PagePayload {
    #[serde(rename = "type")]
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub is_homepage: bool,
    pub is_visible: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

/// Filters for the content listing.
#[derive(Debug, Clone, Default)]
pub struct ContentQuery {
    /// Name filter (`name:like`).
    pub query: Option<String>,
    pub page: Option<u32>,
}

/// Id to path and path to id maps of all content pages.
#[derive(Debug, Default)]
pub struct ContentIndex {
    urls: HashMap<ContentId, String>,
    ids: HashMap<String, LookupId>,
}

impl ContentIndex {
    fn from_pages(pages: Vec<UpstreamPage>) -> Self {
        let mut index = Self::default();
        for page in pages {
            let Some(url) = page.url.filter(|url| !url.is_empty()) else {
                continue;
            };
            index.ids.insert(url.clone(), LookupId::Numeric(page.id));
            index.urls.insert(ContentId::new(page.id), url);
        }
        index
            .ids
            .insert(HOMEPAGE_PATH.to_string(), LookupId::Path(HOMEPAGE_PATH.to_string()));
        index
    }

    #[must_use]
    pub fn url(&self, id: ContentId) -> Option<&str> {
        self.urls.get(&id).map(String::as_str)
    }

    #[must_use]
    pub fn lookup(&self, url: &str) -> Option<UrlLookup> {
        self.ids.get(url).map(|id| UrlLookup {
            id: id.clone(),
            kind: EntityKind::Content,
        })
    }
}

pub struct ContentService<T> {
    transport: Arc<T>,
    classifier: Arc<dyn WriteFailureClassifier>,
    index: ResolutionCache<ContentIndex>,
}

impl<T: Transport> ContentService<T> {
    pub fn new(transport: Arc<T>, classifier: Arc<dyn WriteFailureClassifier>) -> Self {
        Self {
            transport,
            classifier,
            index: ResolutionCache::new("content_urls"),
        }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// One upstream page of content pages.
    ///
    /// # Errors
    ///
    /// Returns the upstream failure.
    #[instrument(skip(self))]
    pub async fn list(&self, query: ContentQuery) -> Result<PageResult<ContentRecord>, UpstreamError> {
        let page = query.page.filter(|p| *p > 0).map(|p| p.to_string());
        let name = query.query.filter(|q| !q.is_empty());

        let mut pairs = Vec::new();
        if let Some(page) = page.as_deref() {
            pairs.push(("page", page));
        }
        if let Some(name) = name.as_deref() {
            pairs.push(("name:like", name));
        }
        pairs.push(("limit", UPSTREAM_LIMIT));

        let path = format!("{PAGES_PATH}?{}", query_string(pairs));
        tracing::debug!(path = %path, "Fetching content pages");

        let envelope: Envelope<Vec<UpstreamPage>> = self.transport.get(&path).await?.json()?;
        let records = envelope
            .data
            .into_iter()
            .map(|page| ContentRecord {
                id: ContentId::new(page.id),
                label: page.name,
                extract: page.url,
            })
            .collect();

        Ok(PageResult::complete(records))
    }

    /// Content pages with the given ids, taken from the first listing page.
    ///
    /// # Errors
    ///
    /// Returns the upstream failure.
    #[instrument(skip(self))]
    pub async fn by_ids(&self, ids: &[ContentId]) -> Result<PageResult<ContentRecord>, UpstreamError> {
        let page = self.list(ContentQuery::default()).await?;
        Ok(page.retain(|record| ids.contains(&record.id)))
    }

    async fn load_index(&self) -> Result<ContentIndex, UpstreamError> {
        tracing::debug!("Loading content page index");
        let pages: Vec<UpstreamPage> = PageCursor::new(&*self.transport, PAGES_PATH, &[("limit", UPSTREAM_LIMIT)])
            .collect_all()
            .await?;
        Ok(ContentIndex::from_pages(pages))
    }

    async fn index(&self) -> Result<Arc<ContentIndex>, UpstreamError> {
        self.index.get_or_load(self.load_index()).await
    }

    /// Storefront path of a content page, `None` for unknown ids.
    ///
    /// # Errors
    ///
    /// Returns the upstream failure if the index has to be loaded and
    /// loading fails.
    #[instrument(skip(self))]
    pub async fn url(&self, id: ContentId) -> Result<Option<String>, UpstreamError> {
        let url = self.index().await?.url(id).map(str::to_string);
        if url.is_none() {
            tracing::debug!(content_id = %id, "No content page with this id");
        }
        Ok(url)
    }

    /// The content page at a storefront path. `/` resolves to the homepage.
    ///
    /// # Errors
    ///
    /// Returns the upstream failure if the index has to be loaded and
    /// loading fails.
    #[instrument(skip(self))]
    pub async fn lookup(&self, url: &str) -> Result<Option<UrlLookup>, UpstreamError> {
        Ok(self.index().await?.lookup(url))
    }

    /// Drop the URL index.
    pub fn invalidate(&self) {
        self.index.invalidate();
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Translate a bridge payload into the upstream page payload.
    ///
    /// With a `next_sibling_id` the page is ordered directly before that
    /// sibling.
    ///
    /// # Errors
    ///
    /// Returns the upstream failure if the sibling cannot be read.
    pub async fn page_payload(
        &self,
        input: &ContentPayload,
        lang: Option<&str>,
    ) -> Result<PagePayload, UpstreamError> {
        let sort_order = match input.next_sibling_id {
            Some(sibling) => self.sort_order_before(sibling).await?,
            None => None,
        };

        Ok(PagePayload {
            kind: "page",
            name: input.name(lang),
            is_homepage: input.is_homepage(),
            is_visible: input.is_visible(),
            url: input.url(lang),
            parent_id: input.parent_id.map(i64::from).filter(|id| *id != 0),
            sort_order,
            body: None,
        })
    }

    async fn sort_order_before(&self, sibling: ContentId) -> Result<Option<i64>, UpstreamError> {
        let path = page_path(sibling);
        tracing::debug!(path = %path, "Fetching next sibling");

        let page: Envelope<SiblingPage> = match self.transport.get(&path).await {
            Ok(response) => response.json()?,
            Err(err) if err.is_not_found() => return Ok(None),
            Err(err) => return Err(err),
        };

        Ok(page
            .data
            .sort_order
            .filter(|order| *order != 0)
            .map(|order| order - 1)
            .filter(|order| *order != 0))
    }

    /// Create a page and store its embed code.
    ///
    /// # Errors
    ///
    /// - `ContentError::Validation` when upstream rejects a field
    /// - `ContentError::Rejected` for other create failures
    /// - `ContentError::EmbedFailed` when the page was created but the
    ///   embed code could not be stored
    #[instrument(skip(self, input))]
    pub async fn create(&self, input: &ContentPayload, lang: Option<&str>) -> Result<ContentId, ContentError> {
        let mut payload = self.page_payload(input, lang).await?;
        payload.body = Some(String::new());
        let body = serde_json::to_value(&payload).map_err(UpstreamError::from)?;

        tracing::debug!(%body, "Creating content page");
        let created = match self.transport.post(PAGES_PATH, &body).await {
            Ok(response) => response,
            Err(err) => {
                if let Some(message) = err.first_message().map(str::to_string) {
                    return Err(ContentError::Rejected { message, source: err });
                }
                self.classify(&Method::POST, &err)?;
                return Err(ContentError::Rejected {
                    message: err.to_string(),
                    source: err,
                });
            }
        };

        let page: Envelope<UpstreamPage> = created.json()?;
        let id = ContentId::new(page.data.id);
        self.invalidate();

        let embed = json!({ "body": embed_code(id) });
        tracing::debug!(content_id = %id, "Storing embed code");
        if let Err(source) = self.transport.put(&page_path(id), &embed).await {
            tracing::error!(content_id = %id, error = %source, "Created page without embed code");
            return Err(ContentError::EmbedFailed { id, source });
        }

        tracing::info!(content_id = %id, "Created content page");
        Ok(id)
    }

    /// Rename or move a page.
    ///
    /// # Errors
    ///
    /// `ContentError::Validation` when upstream rejects a field, otherwise
    /// the upstream failure.
    #[instrument(skip(self, input))]
    pub async fn update(&self, id: ContentId, input: &ContentPayload, lang: Option<&str>) -> Result<(), ContentError> {
        let payload = self.page_payload(input, lang).await?;
        let body = serde_json::to_value(&payload).map_err(UpstreamError::from)?;

        tracing::debug!(content_id = %id, %body, "Updating content page");
        if let Err(err) = self.transport.put(&page_path(id), &body).await {
            self.classify(&Method::PUT, &err)?;
            return Err(err.into());
        }

        self.invalidate();
        Ok(())
    }

    /// Delete a page.
    ///
    /// # Errors
    ///
    /// Returns the upstream failure.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: ContentId) -> Result<(), ContentError> {
        tracing::debug!(content_id = %id, "Deleting content page");
        self.transport.delete(&page_path(id)).await?;
        self.invalidate();
        Ok(())
    }

    fn classify(&self, method: &Method, err: &UpstreamError) -> Result<(), FieldValidationError> {
        self.classifier.classify(method, err.payload())
    }
}
