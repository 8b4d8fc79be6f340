//! Drive item wire types
//!
//! Maps to the driveItem resource returned by the drive API. Facets such as
//! `folder` and `deleted` are detected by key presence: a facet sent as
//! `null` still counts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// A drive item as returned by the backend
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteItem {
    /// Unique identifier of the item within the drive
    pub id: String,

    /// Name of the item (filename or folder name)
    #[serde(default)]
    pub name: String,

    /// Size of the item in bytes
    pub size: Option<u64>,

    #[serde(rename = "eTag")]
    pub e_tag: Option<String>,

    /// Last modified date and time in ISO 8601 format
    pub last_modified_date_time: Option<DateTime<Utc>>,

    /// Reference to the parent item
    pub parent_reference: Option<RemoteParentReference>,

    /// File facet
    pub file: Option<RemoteFileFacet>,

    /// Folder facet; its presence alone marks a folder
    #[serde(default, deserialize_with = "present")]
    pub folder: Option<Value>,

    /// Deleted facet; its presence alone marks a soft-deleted item
    #[serde(default, deserialize_with = "present")]
    pub deleted: Option<Value>,

    /// Expanded children, when requested with `expand=children`
    pub children: Option<Vec<RemoteItem>>,

    /// Time-limited direct download URL
    #[serde(rename = "@content.downloadUrl")]
    pub download_url: Option<String>,
}

impl RemoteItem {
    pub fn is_folder(&self) -> bool {
        self.folder.is_some()
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted.is_some()
    }

    /// Identifier of the parent, if reported
    pub fn parent_id(&self) -> Option<&str> {
        self.parent_reference.as_ref()?.id.as_deref()
    }

    /// Drive path of the parent, e.g. `/drive/root:/Documents`
    pub fn parent_path(&self) -> Option<&str> {
        self.parent_reference.as_ref()?.path.as_deref()
    }
}

/// Parent reference information for a drive item
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteParentReference {
    /// Unique identifier of the parent item
    pub id: Option<String>,

    /// Path of the parent in the drive
    /// Format: `/drive/root:/path/to/parent`
    pub path: Option<String>,
}

/// File facet
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteFileFacet {
    pub mime_type: Option<String>,
}

/// One page of a delta query
#[derive(Debug, Deserialize)]
pub struct RemoteItemPage {
    #[serde(default)]
    pub value: Vec<RemoteItem>,

    /// Present when the backend holds more entries than the page cap
    #[serde(rename = "@odata.nextLink")]
    pub next_link: Option<String>,
}

/// Response to a content request that was not redirected
#[derive(Debug, Deserialize)]
pub struct ContentLink {
    #[serde(rename = "@content.downloadUrl")]
    pub download_url: Option<String>,
}

/// Treats a present key as `Some`, even when its value is `null`
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}
