//! Normalized metadata records
//!
//! Provider-agnostic descriptions of files, folders and revisions. These are
//! produced from backend records that are not soft-deleted; nothing deleted
//! ever reaches a caller through these types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::newtypes::{ETag, RemoteId};

/// A file as seen by callers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMetadata {
    /// Backend identifier of the file
    pub id: RemoteId,
    /// Display name
    pub name: String,
    /// Materialized path, e.g. `/Documents/report.docx`
    pub path: String,
    /// Size in bytes
    pub size: u64,
    /// Current content version; doubles as the revision token
    pub etag: Option<ETag>,
    /// Last modification time reported by the backend
    pub modified: Option<DateTime<Utc>>,
    /// MIME type, when the backend reports one
    pub content_type: Option<String>,
    /// Time-limited direct download URL, when included in the record
    pub download_url: Option<String>,
}

/// A folder as seen by callers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderMetadata {
    /// Backend identifier of the folder
    pub id: RemoteId,
    /// Display name
    pub name: String,
    /// Materialized path with a trailing separator, e.g. `/Documents/`
    pub path: String,
    /// Children in backend order; empty unless the listing was expanded
    pub children: Vec<Metadata>,
}

/// Either a file or a folder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Metadata {
    File(FileMetadata),
    Folder(FolderMetadata),
}

impl Metadata {
    pub fn name(&self) -> &str {
        match self {
            Self::File(f) => &f.name,
            Self::Folder(f) => &f.name,
        }
    }

    pub fn id(&self) -> &RemoteId {
        match self {
            Self::File(f) => &f.id,
            Self::Folder(f) => &f.id,
        }
    }

    pub fn path(&self) -> &str {
        match self {
            Self::File(f) => &f.path,
            Self::Folder(f) => &f.path,
        }
    }

    pub fn is_folder(&self) -> bool {
        matches!(self, Self::Folder(_))
    }

    pub fn as_file(&self) -> Option<&FileMetadata> {
        match self {
            Self::File(f) => Some(f),
            Self::Folder(_) => None,
        }
    }

    pub fn as_folder(&self) -> Option<&FolderMetadata> {
        match self {
            Self::Folder(f) => Some(f),
            Self::File(_) => None,
        }
    }
}

/// Result of a metadata lookup: a single file, or a folder's listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum MetadataResult {
    File(FileMetadata),
    Listing(Vec<Metadata>),
}

impl MetadataResult {
    /// Names of the entries in a listing (or the single file)
    pub fn names(&self) -> Vec<&str> {
        match self {
            Self::File(f) => vec![f.name.as_str()],
            Self::Listing(entries) => entries.iter().map(Metadata::name).collect(),
        }
    }
}

/// A best-effort revision of an item
///
/// The backend's delta feed reports only the latest state per logical item,
/// so superseded intermediate versions are not recoverable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Revision {
    /// Revision token accepted by `download`
    pub etag: ETag,
    /// Identifier of the item the entry describes
    pub item_id: RemoteId,
    /// Name of the item at this revision
    pub name: String,
    /// Modification time of this state
    pub modified: Option<DateTime<Utc>>,
    /// Time-limited direct download URL for this state
    pub download_url: Option<String>,
}
