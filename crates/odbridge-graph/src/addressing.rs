//! Request addressing strategies
//!
//! The drive API accepts the same item under two URL shapes: by identifier
//! (`/items/{id}`) or by drive path (`/root:/a/b:`). One adapter serves both;
//! [`Addressing`] picks the shape used when an identifier is not yet known.

use odbridge_core::config::AddressingMode;
use odbridge_core::domain::{ParentRef, ProviderError, RemoteId, VirtualPath};
use serde_json::{json, Value};

/// Drive path prefix used by the backend in parent references
const DRIVE_ROOT_PREFIX: &str = "/drive/root:";

/// How caller paths map onto backend endpoints
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Addressing {
    /// Non-root caller paths are `/{identifier}`; lookups go through `/items/`
    #[default]
    IdAddressed,
    /// Caller paths are drive paths under the configured root path
    PathAddressed,
}

impl From<AddressingMode> for Addressing {
    fn from(mode: AddressingMode) -> Self {
        match mode {
            AddressingMode::Id => Self::IdAddressed,
            AddressingMode::Path => Self::PathAddressed,
        }
    }
}

/// A backend item reference, rendered into endpoint paths
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemLocator {
    Id(RemoteId),
    /// Drive path starting with `/`; `/` is the drive root
    Path(String),
}

impl ItemLocator {
    /// Endpoint of the item itself, relative to the drive base URL
    pub fn endpoint(&self) -> String {
        match self {
            Self::Id(id) => format!("/items/{}", urlencoding::encode(id.as_str())),
            Self::Path(path) if is_drive_root(path) => "/root".to_string(),
            Self::Path(path) => format!("/root:{}:", encode_path(path)),
        }
    }

    /// Endpoint of a sub-resource such as `children` or `view.delta`
    pub fn endpoint_with(&self, suffix: &str) -> String {
        match self {
            Self::Path(path) if is_drive_root(path) => format!("/root/{suffix}"),
            _ => format!("{}/{suffix}", self.endpoint()),
        }
    }

    /// JSON parent reference for request bodies
    pub fn parent_reference(&self) -> Value {
        match self {
            Self::Id(id) => json!({ "id": id.as_str() }),
            Self::Path(path) if is_drive_root(path) => json!({ "path": DRIVE_ROOT_PREFIX }),
            Self::Path(path) => json!({ "path": format!("{DRIVE_ROOT_PREFIX}{path}") }),
        }
    }
}

impl Addressing {
    /// Locator for the item at `path`
    ///
    /// A resolved identifier always wins. Otherwise the identifier-addressed
    /// strategy takes the leaf segment as the identifier, and the
    /// path-addressed strategy uses the drive path.
    ///
    /// # Errors
    /// Returns `ProviderError::InvalidPath` when the leaf cannot serve as an
    /// identifier
    pub fn item_locator(
        &self,
        path: &VirtualPath,
        root_id: &RemoteId,
    ) -> Result<ItemLocator, ProviderError> {
        match self {
            Self::IdAddressed if path.is_root() => Ok(ItemLocator::Id(root_id.clone())),
            Self::IdAddressed => match path.identifier() {
                Some(id) => Ok(ItemLocator::Id(id.clone())),
                None => leaf_as_id(path.name()),
            },
            Self::PathAddressed if path.is_root() => Ok(ItemLocator::Path(path.full_path())),
            Self::PathAddressed => Ok(match path.identifier() {
                Some(id) => ItemLocator::Id(id.clone()),
                None => ItemLocator::Path(path.full_path()),
            }),
        }
    }

    /// Locator for the folder containing `path`
    ///
    /// # Errors
    /// Returns `ProviderError::InvalidPath` for the root, which has no parent
    pub fn parent_locator(
        &self,
        path: &VirtualPath,
        root_id: &RemoteId,
    ) -> Result<ItemLocator, ProviderError> {
        let (parent, reference) = path.parent().zip(path.parent_reference()).ok_or_else(|| {
            ProviderError::InvalidPath(format!("'{path}' has no parent folder"))
        })?;

        if parent.is_root() {
            return self.item_locator(&parent, root_id);
        }

        match (self, reference) {
            (_, ParentRef::Id(id)) => Ok(ItemLocator::Id(id)),
            (Self::IdAddressed, ParentRef::Literal(name)) => leaf_as_id(&name),
            (Self::PathAddressed, ParentRef::Literal(_)) => {
                Ok(ItemLocator::Path(parent.full_path()))
            }
        }
    }
}

fn leaf_as_id(name: &str) -> Result<ItemLocator, ProviderError> {
    RemoteId::new(name.to_string())
        .map(ItemLocator::Id)
        .map_err(|e| ProviderError::InvalidPath(e.to_string()))
}

fn is_drive_root(path: &str) -> bool {
    path.trim_matches('/').is_empty()
}

fn encode_path(path: &str) -> String {
    path.split('/')
        .filter(|s| !s.is_empty())
        .map(|s| format!("/{}", urlencoding::encode(s)))
        .collect()
}
