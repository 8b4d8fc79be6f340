//! Domain entities and value types
//!
//! This module contains the core domain types for odbridge:
//! - Newtypes for backend identifiers and version tags
//! - Virtual paths with parallel identifier chains
//! - Normalized file, folder and revision metadata
//! - Upload conflict policies
//! - Content streams and transfer outcomes
//! - Domain and provider error types

pub mod conflict;
pub mod errors;
pub mod metadata;
pub mod newtypes;
pub mod path;
pub mod transfer;

// Re-export commonly used types
pub use conflict::{ConflictPolicy, ConflictResolution};
pub use errors::{DomainError, Operation, ProviderError};
pub use metadata::{FileMetadata, FolderMetadata, Metadata, MetadataResult, Revision};
pub use newtypes::{ETag, RemoteId};
pub use path::{ParentRef, VirtualPath};
pub use transfer::{ByteRange, ByteStream, DownloadStream, TransferOutcome, UploadStream};
