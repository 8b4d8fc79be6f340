//! Domain error types
//!
//! Two families live here:
//! - [`DomainError`] for validation failures of domain values (paths,
//!   identifiers, policies) that never touch the network.
//! - [`ProviderError`] for failures surfaced by a storage provider
//!   operation, keeping the backend status code where one exists.

use std::fmt;

use thiserror::Error;

/// Errors that can occur in domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Invalid path format or content
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// Invalid remote ID format
    #[error("Invalid remote ID: {0}")]
    InvalidRemoteId(String),

    /// Unknown conflict policy name
    #[error("Invalid conflict policy: {0}")]
    InvalidConflictPolicy(String),

    /// Generic validation failure
    #[error("Validation failed: {0}")]
    ValidationFailed(String),
}

/// The operation family a request or error belongs to
///
/// Used by the transport layer to wrap an unexpected status into the
/// operation-specific [`ProviderError`] variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Metadata,
    Download,
    Upload,
    Delete,
    CreateFolder,
    Revisions,
    IntraCopy,
    IntraMove,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Metadata => "metadata",
            Self::Download => "download",
            Self::Upload => "upload",
            Self::Delete => "delete",
            Self::CreateFolder => "create_folder",
            Self::Revisions => "revisions",
            Self::IntraCopy => "intra_copy",
            Self::IntraMove => "intra_move",
        };
        f.write_str(name)
    }
}

/// Errors surfaced by storage provider operations
///
/// Status-bearing variants preserve the backend status code so upper layers
/// can tell "does not exist" from "transient backend fault" from
/// "operation unsupported".
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The path or revision does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Metadata could not be read or was malformed
    #[error("Metadata error ({code}): {message}")]
    Metadata { code: u16, message: String },

    /// Downloading content failed
    #[error("Download error ({code}): {message}")]
    Download { code: u16, message: String },

    /// Uploading content failed
    #[error("Upload error ({code}): {message}")]
    Upload { code: u16, message: String },

    /// Deleting an item failed
    #[error("Delete error ({code}): {message}")]
    Delete { code: u16, message: String },

    /// Creating a folder failed
    #[error("Create folder error ({code}): {message}")]
    CreateFolder { code: u16, message: String },

    /// Listing revisions failed
    #[error("Revisions error ({code}): {message}")]
    Revisions { code: u16, message: String },

    /// Copying within the provider failed
    #[error("Intra-copy error ({code}): {message}")]
    IntraCopy { code: u16, message: String },

    /// Moving within the provider failed
    #[error("Intra-move error ({code}): {message}")]
    IntraMove { code: u16, message: String },

    /// The path is not acceptable for the requested operation
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// An item already exists and the conflict policy forbids replacing it
    #[error("Naming conflict: {0}")]
    NamingConflict(String),

    /// The request never produced a response status
    #[error("Transport error during {operation}: {message}")]
    Transport { operation: Operation, message: String },

    /// A successful response carried a body that could not be understood
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl ProviderError {
    /// Wraps an unexpected backend status into the variant for `operation`
    pub fn from_status(operation: Operation, code: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match operation {
            Operation::Metadata => Self::Metadata { code, message },
            Operation::Download => Self::Download { code, message },
            Operation::Upload => Self::Upload { code, message },
            Operation::Delete => Self::Delete { code, message },
            Operation::CreateFolder => Self::CreateFolder { code, message },
            Operation::Revisions => Self::Revisions { code, message },
            Operation::IntraCopy => Self::IntraCopy { code, message },
            Operation::IntraMove => Self::IntraMove { code, message },
        }
    }

    /// The status code associated with this error, when there is one
    pub fn code(&self) -> Option<u16> {
        match self {
            Self::NotFound(_) => Some(404),
            Self::InvalidPath(_) => Some(400),
            Self::NamingConflict(_) => Some(409),
            Self::Metadata { code, .. }
            | Self::Download { code, .. }
            | Self::Upload { code, .. }
            | Self::Delete { code, .. }
            | Self::CreateFolder { code, .. }
            | Self::Revisions { code, .. }
            | Self::IntraCopy { code, .. }
            | Self::IntraMove { code, .. } => Some(*code),
            Self::Transport { .. } | Self::InvalidResponse(_) => None,
        }
    }

    /// Returns true when the error means the item does not exist
    ///
    /// Covers [`ProviderError::NotFound`] as well as any operation error
    /// carrying a 404 status.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_)) || self.code() == Some(404)
    }

    /// Returns true for a capability-denied (403) backend refusal
    pub fn is_capability_denied(&self) -> bool {
        !matches!(self, Self::NotFound(_) | Self::InvalidPath(_)) && self.code() == Some(403)
    }
}
