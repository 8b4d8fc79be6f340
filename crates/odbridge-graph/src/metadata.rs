//! Metadata normalization
//!
//! Turns [`RemoteItem`]s into the provider-agnostic records callers see.
//! The `folder` facet decides file vs folder; soft-deleted items never make
//! it through: a deleted top-level item is an error, deleted children are
//! dropped.

use odbridge_core::domain::{
    ETag, FileMetadata, FolderMetadata, Metadata, MetadataResult, ProviderError, RemoteId,
    Revision, VirtualPath,
};

use crate::item::RemoteItem;

/// Prefix the backend puts in front of drive paths in parent references
const DRIVE_ROOT_PREFIX: &str = "/drive/root:";

/// Converts backend items into normalized metadata
///
/// Holds the prepend segments so drive paths under a configured root path
/// come out relative to it.
#[derive(Debug, Clone, Default)]
pub struct MetadataNormalizer {
    prepend: Vec<String>,
}

impl MetadataNormalizer {
    pub fn new(prepend: Option<&str>) -> Self {
        Self {
            prepend: prepend.map(split_segments).unwrap_or_default(),
        }
    }

    // ========================================================================
    // Top-level entry points
    // ========================================================================

    /// Result of a metadata lookup on `requested`
    ///
    /// A folder yields its (non-deleted) children; a file yields itself.
    ///
    /// # Errors
    /// `ProviderError::Metadata` with code 404 if the item is soft-deleted
    pub fn metadata(
        &self,
        item: RemoteItem,
        requested: &VirtualPath,
    ) -> Result<MetadataResult, ProviderError> {
        let hint = parent_hint(requested);
        let segments = self.locate(&item, hint.as_deref());
        reject_deleted(&item, &segments)?;

        if item.is_folder() {
            let children = self.children(item.children.unwrap_or_default(), &segments)?;
            Ok(MetadataResult::Listing(children))
        } else {
            self.build_file(item, segments).map(MetadataResult::File)
        }
    }

    /// A single entry, classified by its folder facet
    ///
    /// Folder entries carry their expanded children, recursively normalized.
    ///
    /// # Arguments
    /// * `item` - The backend item
    /// * `parent_hint` - Caller-visible parent segments, used when the item
    ///   carries no parent path
    pub fn entry(
        &self,
        item: RemoteItem,
        parent_hint: Option<&[String]>,
    ) -> Result<Metadata, ProviderError> {
        let segments = self.locate(&item, parent_hint);
        reject_deleted(&item, &segments)?;
        self.classify(item, segments)
    }

    /// Like [`entry`](Self::entry), but requires a file
    pub fn file(
        &self,
        item: RemoteItem,
        parent_hint: Option<&[String]>,
    ) -> Result<FileMetadata, ProviderError> {
        match self.entry(item, parent_hint)? {
            Metadata::File(file) => Ok(file),
            Metadata::Folder(folder) => Err(ProviderError::InvalidResponse(format!(
                "Expected a file at '{}', got a folder",
                folder.path
            ))),
        }
    }

    /// Like [`entry`](Self::entry), but requires a folder
    pub fn folder(
        &self,
        item: RemoteItem,
        parent_hint: Option<&[String]>,
    ) -> Result<FolderMetadata, ProviderError> {
        match self.entry(item, parent_hint)? {
            Metadata::Folder(folder) => Ok(folder),
            Metadata::File(file) => Err(ProviderError::InvalidResponse(format!(
                "Expected a folder at '{}', got a file",
                file.path
            ))),
        }
    }

    /// A revision entry from the delta feed
    ///
    /// Deleted entries and entries without an ETag yield `None`.
    pub fn revision(&self, item: RemoteItem) -> Result<Option<Revision>, ProviderError> {
        if item.is_deleted() {
            return Ok(None);
        }
        let Some(etag) = item.e_tag.and_then(|tag| ETag::new(tag).ok()) else {
            return Ok(None);
        };
        Ok(Some(Revision {
            etag,
            item_id: remote_id(&item.id)?,
            name: item.name,
            modified: item.last_modified_date_time,
            download_url: item.download_url,
        }))
    }

    // ========================================================================
    // Locating items in the caller's hierarchy
    // ========================================================================

    /// Caller-visible name segments of `item`, root excluded
    ///
    /// Built from the parent path (drive prefix and prepend stripped) plus
    /// the item name. Without a parent path the hint is used; without either
    /// the item is taken to be the root.
    pub fn locate(&self, item: &RemoteItem, parent_hint: Option<&[String]>) -> Vec<String> {
        // The configured root folder itself
        if self.is_prepend_leaf(item) {
            return Vec::new();
        }

        let mut segments = match (item.parent_path(), parent_hint) {
            (Some(drive_path), _) => self.strip_prepend(drive_segments(drive_path)),
            (None, Some(hint)) => hint.to_vec(),
            (None, None) => return Vec::new(),
        };
        segments.push(item.name.clone());
        segments
    }

    fn strip_prepend(&self, segments: Vec<String>) -> Vec<String> {
        if !self.prepend.is_empty() && segments.starts_with(&self.prepend) {
            segments[self.prepend.len()..].to_vec()
        } else {
            segments
        }
    }

    /// True when `item` is the last segment of the prepend, seen from its
    /// own parent
    fn is_prepend_leaf(&self, item: &RemoteItem) -> bool {
        let (Some((leaf, parent)), Some(drive_path)) = (self.prepend.split_last(), item.parent_path())
        else {
            return false;
        };
        *leaf == item.name && drive_segments(drive_path) == parent
    }

    // ========================================================================
    // Record construction
    // ========================================================================

    fn classify(&self, item: RemoteItem, segments: Vec<String>) -> Result<Metadata, ProviderError> {
        if item.is_folder() {
            self.build_folder(item, segments).map(Metadata::Folder)
        } else {
            self.build_file(item, segments).map(Metadata::File)
        }
    }

    fn children(
        &self,
        children: Vec<RemoteItem>,
        parent: &[String],
    ) -> Result<Vec<Metadata>, ProviderError> {
        children
            .into_iter()
            .filter(|child| !child.is_deleted())
            .map(|child| {
                let segments = self.locate(&child, Some(parent));
                self.classify(child, segments)
            })
            .collect()
    }

    fn build_file(
        &self,
        item: RemoteItem,
        segments: Vec<String>,
    ) -> Result<FileMetadata, ProviderError> {
        Ok(FileMetadata {
            id: remote_id(&item.id)?,
            path: render(&segments, false),
            name: item.name,
            size: item.size.unwrap_or(0),
            etag: item.e_tag.and_then(|tag| ETag::new(tag).ok()),
            modified: item.last_modified_date_time,
            content_type: item.file.and_then(|f| f.mime_type),
            download_url: item.download_url,
        })
    }

    fn build_folder(
        &self,
        item: RemoteItem,
        segments: Vec<String>,
    ) -> Result<FolderMetadata, ProviderError> {
        let children = self.children(item.children.unwrap_or_default(), &segments)?;
        Ok(FolderMetadata {
            id: remote_id(&item.id)?,
            path: render(&segments, true),
            name: item.name,
            children,
        })
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Parent segments of a caller path, root excluded; `None` for the root
pub fn parent_hint(path: &VirtualPath) -> Option<Vec<String>> {
    let names = path.names();
    (names.len() > 1).then(|| names[1..names.len() - 1].to_vec())
}

/// Splits a drive parent path into segments, dropping the drive prefix
///
/// `/drive/root:/Documents/Sub` becomes `["Documents", "Sub"]`. Paths of
/// other drives (`/drives/{id}/root:/...`) are handled the same way; a path
/// without a recognizable prefix is used as-is.
pub fn drive_segments(drive_path: &str) -> Vec<String> {
    let rest = drive_path
        .strip_prefix(DRIVE_ROOT_PREFIX)
        .or_else(|| drive_path.split_once("/root:").map(|(_, rest)| rest))
        .unwrap_or(drive_path);
    split_segments(rest)
}

fn split_segments(path: &str) -> Vec<String> {
    path.split('/')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn render(segments: &[String], is_folder: bool) -> String {
    if segments.is_empty() {
        return "/".to_string();
    }
    let mut out: String = segments.iter().map(|s| format!("/{s}")).collect();
    if is_folder {
        out.push('/');
    }
    out
}

fn reject_deleted(item: &RemoteItem, segments: &[String]) -> Result<(), ProviderError> {
    if !item.is_deleted() {
        return Ok(());
    }
    let kind = if item.is_folder() { "folder" } else { "file" };
    Err(ProviderError::Metadata {
        code: 404,
        message: format!(
            "Could not retrieve {kind} '{}'",
            render(segments, item.is_folder())
        ),
    })
}

/// Parses a backend identifier
pub(crate) fn remote_id(raw: &str) -> Result<RemoteId, ProviderError> {
    RemoteId::new(raw.to_string())
        .map_err(|e| ProviderError::InvalidResponse(format!("Bad item identifier: {e}")))
}
