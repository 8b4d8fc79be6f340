//! Path resolution
//!
//! Maps a caller path onto the backend's identifier chain. The root never
//! costs a request. Any other path is looked up once; a not-found answer is
//! not an error but marks a creation target.

use odbridge_core::domain::{Operation, ProviderError, RemoteId, VirtualPath};
use reqwest::{Method, StatusCode};
use tracing::debug;

use crate::addressing::Addressing;
use crate::client::read_json;
use crate::item::RemoteItem;
use crate::metadata::{parent_hint, remote_id};
use crate::provider::Backend;

/// Statuses the lookup accepts; anything but 200 means "does not exist yet"
const LOOKUP_STATUSES: &[StatusCode] = &[
    StatusCode::OK,
    StatusCode::BAD_REQUEST,
    StatusCode::NOT_FOUND,
];

/// Resolves caller paths against the backend
pub(crate) struct PathResolver<'a> {
    backend: Backend<'a>,
}

impl<'a> PathResolver<'a> {
    pub(crate) fn new(backend: Backend<'a>) -> Self {
        Self { backend }
    }

    /// Parses and resolves `raw`
    ///
    /// # Errors
    /// - `ProviderError::InvalidPath` if `raw` is not a valid path
    /// - `ProviderError::Metadata` for any lookup status other than 200,
    ///   400 or 404
    pub(crate) async fn resolve(&self, raw: &str) -> Result<VirtualPath, ProviderError> {
        let settings = self.backend.settings;
        let parsed = VirtualPath::parse(raw, settings.root_id.clone())
            .map_err(|e| ProviderError::InvalidPath(e.to_string()))?
            .with_prepend(settings.prepend());

        if parsed.is_root() {
            debug!(path = %parsed, "Root path resolved without lookup");
            return Ok(parsed);
        }

        let locator = settings
            .addressing
            .item_locator(&parsed, &settings.root_id)?;
        let url = format!("{}?expand=children", locator.endpoint());
        let client = self.backend.client;
        let response = client
            .send(
                Operation::Metadata,
                client.request(Method::GET, &url),
                LOOKUP_STATUSES,
            )
            .await?;

        if response.status() != StatusCode::OK {
            debug!(
                path = %parsed,
                status = response.status().as_u16(),
                "Path does not exist yet"
            );
            return Ok(parsed);
        }

        let item: RemoteItem = read_json(response).await?;
        let resolved = self.assemble(&item, &parsed)?;
        debug!(
            path = %resolved,
            id = ?resolved.identifier(),
            "Path resolved"
        );
        Ok(resolved)
    }

    /// Rebuilds name and identifier chains from a looked-up item
    fn assemble(&self, item: &RemoteItem, parsed: &VirtualPath) -> Result<VirtualPath, ProviderError> {
        let hint = parent_hint(parsed);
        let mut segments = self.backend.normalizer.locate(item, hint.as_deref());
        if self.backend.settings.addressing == Addressing::PathAddressed {
            keep_requested_leaf(&mut segments, parsed.name());
        }
        let item_id = remote_id(&item.id)?;

        if segments.is_empty() {
            return Ok(VirtualPath::root(item_id).with_prepend(parsed.prepend().map(str::to_string)));
        }

        let parent_id = item.parent_id().map(remote_id).transpose()?;
        let mut names = Vec::with_capacity(segments.len() + 1);
        names.push(String::new());
        names.extend(segments);

        let ids = pad_ids(parent_id, item_id, names.len());
        VirtualPath::from_parts(names, ids, parsed.is_folder())
            .map(|path| path.with_prepend(parsed.prepend().map(str::to_string)))
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))
    }
}

/// Restores the caller's spelling of the leaf when the backend matched it
/// case-insensitively
///
/// Path lookups ignore letter case, so `/a/Report.docx` can resolve to the
/// stored `report.docx`; the requested spelling is what a rename must see.
pub(crate) fn keep_requested_leaf(segments: &mut [String], requested: &str) {
    if let Some(leaf) = segments.last_mut() {
        if leaf != requested && leaf.to_lowercase() == requested.to_lowercase() {
            *leaf = requested.to_string();
        }
    }
}

/// `[parent, item]`, padded on the left with unknowns to `segment_count`
///
/// The backend reports only the immediate parent; ancestors stay unresolved.
pub(crate) fn pad_ids(
    parent_id: Option<RemoteId>,
    item_id: RemoteId,
    segment_count: usize,
) -> Vec<Option<RemoteId>> {
    let known = [parent_id, Some(item_id)];
    let mut ids: Vec<Option<RemoteId>> = vec![None; segment_count.saturating_sub(known.len())];
    let skip = known.len().saturating_sub(segment_count);
    ids.extend(known.into_iter().skip(skip));
    ids
}
