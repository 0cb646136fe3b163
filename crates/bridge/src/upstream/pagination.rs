//! Page-by-page traversal of upstream listings.

use serde::de::DeserializeOwned;

use super::payload::Envelope;
use super::{Transport, UpstreamError};

/// Upper bound on pages fetched for one listing.
pub const MAX_PAGES: u32 = 1000;

/// Encode query pairs the way browsers encode form data.
///
/// Keys like `categories:in` come out as `categories%3Ain`.
pub fn query_string<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> String {
    url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish()
}

/// Cursor over the pages of a `{data, meta.pagination}` listing.
///
/// Pages are requested one at a time with a `page=N` parameter appended to
/// the fixed query. The cursor stops once `current_page` reaches
/// `total_pages`, or when a response carries no pagination metadata.
pub struct PageCursor<'t, T> {
    transport: &'t T,
    path: String,
    query: Vec<(String, String)>,
    next_page: Option<u32>,
}

impl<'t, T: Transport> PageCursor<'t, T> {
    pub fn new(transport: &'t T, path: impl Into<String>, query: &[(&str, &str)]) -> Self {
        Self {
            transport,
            path: path.into(),
            query: query
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
            next_page: Some(1),
        }
    }

    /// Rewind to the first page.
    #[cfg(test)]
    pub const fn restart(&mut self) {
        self.next_page = Some(1);
    }

    fn page_url(&self, page: u32) -> String {
        let page = page.to_string();
        let query = query_string(
            self.query
                .iter()
                .map(|(k, v)| (k.as_str(), v.as_str()))
                .chain(std::iter::once(("page", page.as_str()))),
        );
        format!("{}?{query}", self.path)
    }

    /// Fetch the next page, or `None` once the listing is exhausted.
    ///
    /// # Errors
    ///
    /// Returns the upstream failure, a parse error for malformed pages, or
    /// `UpstreamError::PaginationLimit` past [`MAX_PAGES`].
    pub async fn next_page<R>(&mut self) -> Result<Option<Vec<R>>, UpstreamError>
    where
        R: DeserializeOwned + Send,
    {
        let Some(page) = self.next_page else {
            return Ok(None);
        };
        if page > MAX_PAGES {
            self.next_page = None;
            return Err(UpstreamError::PaginationLimit {
                path: self.path.clone(),
                pages: MAX_PAGES,
            });
        }

        let response = self.transport.get(&self.page_url(page)).await?;
        let envelope: Envelope<Vec<R>> = response.json()?;

        self.next_page = envelope.meta.has_next().then_some(page + 1);
        Ok(Some(envelope.data))
    }

    /// Drain the remaining pages into one list.
    ///
    /// # Errors
    ///
    /// Fails as a whole if any page fails; no partial list is returned.
    pub async fn collect_all<R>(mut self) -> Result<Vec<R>, UpstreamError>
    where
        R: DeserializeOwned + Send,
    {
        let mut items = Vec::new();
        while let Some(page) = self.next_page::<R>().await? {
            items.extend(page);
        }
        Ok(items)
    }
}
