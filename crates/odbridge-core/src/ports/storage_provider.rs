//! Storage provider port (driven/secondary port)
//!
//! The uniform contract every backend adapter presents to the host
//! abstraction layer: validate a path, read metadata, transfer content,
//! delete, create folders, list revisions and move/copy within the backend.
//!
//! ## Design Notes
//!
//! - Errors are typed ([`ProviderError`]) so hosts can distinguish missing
//!   items from backend faults and unsupported operations.
//! - Uses `#[async_trait]` for async trait methods.
//! - Adapters hold only immutable per-session configuration; every method
//!   takes `&self` and may run concurrently with any other.

use serde::{Deserialize, Serialize};

use crate::domain::{
    ByteRange, ConflictPolicy, DownloadStream, ETag, FileMetadata, FolderMetadata,
    MetadataResult, ProviderError, Revision, TransferOutcome, UploadStream, VirtualPath,
};

/// Who a provider instance is: backend name plus the account it acts for
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProviderIdentity {
    /// Backend name, e.g. `"onedrive"`
    pub name: String,
    /// Opaque account/root discriminator
    pub account: String,
}

/// Port trait for storage backend operations
#[async_trait::async_trait]
pub trait StorageProvider: Send + Sync {
    /// Identity used by the capability predicates
    fn identity(&self) -> ProviderIdentity;

    /// Resolves a caller-supplied path string
    ///
    /// A path that does not exist yet is still valid (a creation target); it
    /// comes back with its leaf identifier unresolved.
    async fn validate_path(&self, raw: &str) -> Result<VirtualPath, ProviderError>;

    /// Reads a single file's metadata, or a folder's listing
    async fn metadata(&self, path: &VirtualPath) -> Result<MetadataResult, ProviderError>;

    /// Returns whether an item exists at `path`
    ///
    /// NotFound-class errors map to `false`; every other error propagates.
    async fn exists(&self, path: &VirtualPath) -> Result<bool, ProviderError> {
        match self.metadata(path).await {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Streams a file's content, optionally at a past revision and/or for a
    /// byte range
    async fn download(
        &self,
        path: &VirtualPath,
        revision: Option<&ETag>,
        range: Option<ByteRange>,
    ) -> Result<DownloadStream, ProviderError>;

    /// Writes content at `path` under the given conflict policy
    ///
    /// # Returns
    /// The new file's metadata and `true` if the file was newly created
    async fn upload(
        &self,
        stream: UploadStream,
        path: &VirtualPath,
        conflict: &ConflictPolicy,
    ) -> Result<(FileMetadata, bool), ProviderError>;

    /// Deletes the item at `path`
    async fn delete(&self, path: &VirtualPath) -> Result<(), ProviderError>;

    /// Creates the folder denoted by `path` (which must end with a separator)
    async fn create_folder(&self, path: &VirtualPath) -> Result<FolderMetadata, ProviderError>;

    /// Lists best-effort revisions of the item at `path`
    async fn revisions(&self, path: &VirtualPath) -> Result<Vec<Revision>, ProviderError>;

    /// Copies `src` to `dest` within the same backend account
    async fn intra_copy(
        &self,
        dest_provider: &dyn StorageProvider,
        src: &VirtualPath,
        dest: &VirtualPath,
    ) -> Result<TransferOutcome, ProviderError>;

    /// Moves `src` to `dest` within the same backend account
    async fn intra_move(
        &self,
        dest_provider: &dyn StorageProvider,
        src: &VirtualPath,
        dest: &VirtualPath,
    ) -> Result<TransferOutcome, ProviderError>;

    /// Whether two siblings may share a name
    fn can_duplicate_names(&self) -> bool;

    /// Whether [`intra_copy`](Self::intra_copy) can target `dest_provider`
    fn can_intra_copy(&self, dest_provider: &dyn StorageProvider) -> bool;

    /// Whether [`intra_move`](Self::intra_move) can target `dest_provider`
    fn can_intra_move(&self, dest_provider: &dyn StorageProvider) -> bool;
}
