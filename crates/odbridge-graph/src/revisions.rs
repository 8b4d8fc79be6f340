//! Revision tracking
//!
//! The delta feed stands in for a version history. It reports only the
//! latest state per item, so revisions are best-effort: superseded versions
//! are gone. Only the first page (capped by `delta_page_size`) is read.

use odbridge_core::domain::{ETag, Operation, ProviderError, Revision, VirtualPath};
use reqwest::header::LOCATION;
use reqwest::{Method, StatusCode};
use tracing::{debug, warn};

use crate::client::read_json;
use crate::item::{ContentLink, RemoteItem, RemoteItemPage};
use crate::provider::Backend;

pub(crate) struct RevisionTracker<'a> {
    backend: Backend<'a>,
}

impl<'a> RevisionTracker<'a> {
    pub(crate) fn new(backend: Backend<'a>) -> Self {
        Self { backend }
    }

    /// Non-deleted revisions of the item at `path`, in feed order
    pub(crate) async fn list(&self, path: &VirtualPath) -> Result<Vec<Revision>, ProviderError> {
        let normalizer = self.backend.normalizer;
        let mut revisions = Vec::new();
        for item in self.delta(path).await? {
            if let Some(revision) = normalizer.revision(item)? {
                revisions.push(revision);
            }
        }
        debug!(path = %path, count = revisions.len(), "Listed revisions");
        Ok(revisions)
    }

    /// Direct download URL for `path`, at `revision` when one is given
    ///
    /// # Errors
    /// - `ProviderError::NotFound` if the revision is absent from the feed,
    ///   or the backend offers no download URL
    /// - `ProviderError::Revisions` / `ProviderError::Metadata` for
    ///   unexpected statuses
    pub(crate) async fn download_url(
        &self,
        path: &VirtualPath,
        revision: Option<&ETag>,
    ) -> Result<String, ProviderError> {
        let url = match revision {
            Some(etag) => self.revision_url(path, etag).await?,
            None => self.current_url(path).await?,
        };
        url.ok_or_else(|| ProviderError::NotFound(path.to_string()))
    }

    async fn revision_url(
        &self,
        path: &VirtualPath,
        etag: &ETag,
    ) -> Result<Option<String>, ProviderError> {
        let entries = self.delta(path).await?;
        let hit = entries
            .into_iter()
            .filter(|item| !item.is_deleted())
            .find(|item| item.e_tag.as_deref() == Some(etag.as_str()));

        match hit {
            Some(item) => Ok(item.download_url),
            None => {
                debug!(path = %path, revision = %etag, "Revision not in delta feed");
                Err(ProviderError::NotFound(format!("{path} at revision {etag}")))
            }
        }
    }

    /// Current download URL, read from the content endpoint
    ///
    /// The endpoint either redirects to the URL or returns it in the body.
    async fn current_url(&self, path: &VirtualPath) -> Result<Option<String>, ProviderError> {
        let settings = self.backend.settings;
        let client = self.backend.client;
        let locator = settings.addressing.item_locator(path, &settings.root_id)?;
        let response = client
            .send(
                Operation::Metadata,
                client.request(Method::GET, &locator.endpoint_with("content")),
                &[StatusCode::OK, StatusCode::FOUND],
            )
            .await?;

        if response.status() == StatusCode::FOUND {
            return Ok(response
                .headers()
                .get(LOCATION)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string));
        }

        let link: ContentLink = read_json(response).await?;
        Ok(link.download_url)
    }

    async fn delta(&self, path: &VirtualPath) -> Result<Vec<RemoteItem>, ProviderError> {
        let settings = self.backend.settings;
        let client = self.backend.client;
        let locator = settings.addressing.item_locator(path, &settings.root_id)?;
        let url = format!(
            "{}?top={}",
            locator.endpoint_with("view.delta"),
            settings.delta_page_size
        );

        let response = client
            .send(
                Operation::Revisions,
                client.request(Method::GET, &url),
                &[StatusCode::OK],
            )
            .await?;
        let page: RemoteItemPage = read_json(response).await?;

        if page.next_link.is_some() {
            warn!(
                path = %path,
                page_size = settings.delta_page_size,
                "Delta feed has more entries than one page; the rest are not read"
            );
        }
        Ok(page.value)
    }
}
