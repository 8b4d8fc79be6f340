//! OneDriveProvider - StorageProvider implementation for the OneDrive drive API
//!
//! Every operation enters through the caller's resolved [`VirtualPath`] and
//! is delegated to the component owning that concern:
//!
//! - `PathResolver` for `validate_path`
//! - [`MetadataNormalizer`] for every returned record
//! - `RevisionTracker` for revisions and download URLs
//! - `UploadConflictHandler` for uploads
//! - `MoveCopyCoordinator` for intra-provider transfers
//!
//! ## Design Notes
//!
//! - The provider holds only immutable per-session state, so no locking is
//!   needed; concurrent calls share the underlying connection pool.
//! - Cancellation is the caller's: dropping an operation's future drops the
//!   in-flight request.

use std::sync::Arc;

use async_trait::async_trait;
use futures_util::TryStreamExt;
use odbridge_core::domain::{
    ByteRange, ConflictPolicy, DownloadStream, ETag, FileMetadata, FolderMetadata,
    MetadataResult, Operation, ProviderError, Revision, TransferOutcome, UploadStream,
    VirtualPath,
};
use odbridge_core::ports::{
    NameConflictResolver, ProviderIdentity, ProviderObserver, StorageProvider,
};
use reqwest::header::RANGE;
use reqwest::{Method, StatusCode};
use serde_json::json;
use tracing::{debug, info};

use crate::client::{read_json, GraphClient};
use crate::metadata::{parent_hint, MetadataNormalizer};
use crate::move_copy::MoveCopyCoordinator;
use crate::resolver::PathResolver;
use crate::revisions::RevisionTracker;
use crate::settings::ProviderSettings;
use crate::upload::UploadConflictHandler;

/// Backend name reported in [`ProviderIdentity`]
pub const PROVIDER_NAME: &str = "onedrive";

/// Borrowed view of the provider state shared by the components
#[derive(Clone, Copy)]
pub(crate) struct Backend<'a> {
    pub client: &'a GraphClient,
    pub settings: &'a ProviderSettings,
    pub normalizer: &'a MetadataNormalizer,
}

// ============================================================================
// OneDriveProvider
// ============================================================================

/// Storage provider backed by the OneDrive drive API
pub struct OneDriveProvider {
    client: GraphClient,
    settings: ProviderSettings,
    normalizer: MetadataNormalizer,
    conflicts: Arc<dyn NameConflictResolver>,
}

impl OneDriveProvider {
    /// Creates a provider from session settings
    ///
    /// # Arguments
    /// * `settings` - Endpoint, token, root and addressing strategy
    /// * `conflicts` - Resolver consulted before every upload
    pub fn new(settings: ProviderSettings, conflicts: Arc<dyn NameConflictResolver>) -> Self {
        let client = GraphClient::with_base_url(&settings.access_token, &settings.base_url);
        let prepend = settings.prepend();
        Self {
            client,
            normalizer: MetadataNormalizer::new(prepend.as_deref()),
            settings,
            conflicts,
        }
    }

    /// Replaces the observer notified about backend exchanges
    pub fn with_observer(mut self, observer: Arc<dyn ProviderObserver>) -> Self {
        self.client = self.client.with_observer(observer);
        self
    }

    pub fn settings(&self) -> &ProviderSettings {
        &self.settings
    }

    fn backend(&self) -> Backend<'_> {
        Backend {
            client: &self.client,
            settings: &self.settings,
            normalizer: &self.normalizer,
        }
    }

    fn require_same_backend(
        &self,
        operation: Operation,
        allowed: bool,
        dest_provider: &dyn StorageProvider,
    ) -> Result<(), ProviderError> {
        if allowed {
            return Ok(());
        }
        Err(ProviderError::from_status(
            operation,
            400,
            format!(
                "Cannot transfer from {} to provider '{}'",
                PROVIDER_NAME,
                dest_provider.identity().name
            ),
        ))
    }
}

impl std::fmt::Debug for OneDriveProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OneDriveProvider")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl StorageProvider for OneDriveProvider {
    fn identity(&self) -> ProviderIdentity {
        ProviderIdentity {
            name: PROVIDER_NAME.to_string(),
            account: self.settings.root_id.to_string(),
        }
    }

    async fn validate_path(&self, raw: &str) -> Result<VirtualPath, ProviderError> {
        debug!(path = raw, "OneDriveProvider::validate_path");
        PathResolver::new(self.backend()).resolve(raw).await
    }

    /// Reads a file's metadata or a folder's listing
    ///
    /// Makes `GET {item}?expand=children`; a soft-deleted item is reported
    /// as a 404 metadata error.
    async fn metadata(&self, path: &VirtualPath) -> Result<MetadataResult, ProviderError> {
        debug!(path = %path, "OneDriveProvider::metadata");
        let locator = self
            .settings
            .addressing
            .item_locator(path, &self.settings.root_id)?;
        let url = format!("{}?expand=children", locator.endpoint());

        let response = self
            .client
            .send(
                Operation::Metadata,
                self.client.request(Method::GET, &url),
                &[StatusCode::OK],
            )
            .await?;
        self.normalizer.metadata(read_json(response).await?, path)
    }

    /// Streams a file, optionally at a past revision and for a byte range
    ///
    /// Resolves a direct download URL first, then fetches it expecting 200
    /// or 206.
    async fn download(
        &self,
        path: &VirtualPath,
        revision: Option<&ETag>,
        range: Option<ByteRange>,
    ) -> Result<DownloadStream, ProviderError> {
        debug!(path = %path, revision = ?revision, range = ?range, "OneDriveProvider::download");
        let url = RevisionTracker::new(self.backend())
            .download_url(path, revision)
            .await?;

        let mut builder = self.client.request_url(Method::GET, &url);
        if let Some(range) = range {
            builder = builder.header(RANGE, range.header_value());
        }
        let response = self
            .client
            .send(
                Operation::Download,
                builder,
                &[StatusCode::OK, StatusCode::PARTIAL_CONTENT],
            )
            .await?;

        let partial = response.status() == StatusCode::PARTIAL_CONTENT;
        let size = response.content_length();
        let stream = response
            .bytes_stream()
            .map_err(|e| ProviderError::Transport {
                operation: Operation::Download,
                message: e.without_url().to_string(),
            });

        Ok(DownloadStream {
            size,
            partial,
            stream: Box::pin(stream),
        })
    }

    async fn upload(
        &self,
        stream: UploadStream,
        path: &VirtualPath,
        conflict: &ConflictPolicy,
    ) -> Result<(FileMetadata, bool), ProviderError> {
        debug!(path = %path, conflict = %conflict, "OneDriveProvider::upload");
        UploadConflictHandler::new(self.backend(), self.conflicts.as_ref())
            .upload(self, stream, path, conflict)
            .await
    }

    /// Deletes an item
    ///
    /// Makes `DELETE {item}`, expecting 204. The configured root is never
    /// deleted.
    async fn delete(&self, path: &VirtualPath) -> Result<(), ProviderError> {
        if path.is_root() {
            return Err(ProviderError::InvalidPath(
                "Refusing to delete the root folder".to_string(),
            ));
        }

        let locator = self
            .settings
            .addressing
            .item_locator(path, &self.settings.root_id)?;
        self.client
            .send(
                Operation::Delete,
                self.client.request(Method::DELETE, &locator.endpoint()),
                &[StatusCode::NO_CONTENT],
            )
            .await?;

        info!(path = %path, "Item deleted");
        Ok(())
    }

    /// Creates a folder under the path's parent
    ///
    /// Makes `POST {parent}/children`; the backend renames on conflict.
    async fn create_folder(&self, path: &VirtualPath) -> Result<FolderMetadata, ProviderError> {
        if !path.is_folder() || path.is_root() {
            return Err(ProviderError::InvalidPath(format!(
                "'{path}' is not a folder path; folder paths end with '/'"
            )));
        }

        let parent = self
            .settings
            .addressing
            .parent_locator(path, &self.settings.root_id)?;
        let body = json!({
            "name": path.name(),
            "folder": {},
            "@name.conflictBehavior": "rename",
        });

        let response = self
            .client
            .send(
                Operation::CreateFolder,
                self.client
                    .request(Method::POST, &parent.endpoint_with("children"))
                    .json(&body),
                &[StatusCode::CREATED],
            )
            .await?;

        let hint = parent_hint(path);
        let folder = self
            .normalizer
            .folder(read_json(response).await?, hint.as_deref())?;
        info!(path = %folder.path, "Folder created");
        Ok(folder)
    }

    /// Best-effort revisions from the delta feed; superseded versions are
    /// not recoverable
    async fn revisions(&self, path: &VirtualPath) -> Result<Vec<Revision>, ProviderError> {
        RevisionTracker::new(self.backend()).list(path).await
    }

    async fn intra_copy(
        &self,
        dest_provider: &dyn StorageProvider,
        src: &VirtualPath,
        dest: &VirtualPath,
    ) -> Result<TransferOutcome, ProviderError> {
        self.require_same_backend(
            Operation::IntraCopy,
            self.can_intra_copy(dest_provider),
            dest_provider,
        )?;
        MoveCopyCoordinator::new(self.backend()).copy(src, dest).await
    }

    async fn intra_move(
        &self,
        dest_provider: &dyn StorageProvider,
        src: &VirtualPath,
        dest: &VirtualPath,
    ) -> Result<TransferOutcome, ProviderError> {
        self.require_same_backend(
            Operation::IntraMove,
            self.can_intra_move(dest_provider),
            dest_provider,
        )?;
        MoveCopyCoordinator::new(self.backend())
            .move_item(src, dest)
            .await
    }

    /// The backend renames on conflict instead of keeping duplicates
    fn can_duplicate_names(&self) -> bool {
        false
    }

    fn can_intra_copy(&self, dest_provider: &dyn StorageProvider) -> bool {
        dest_provider.identity().name == PROVIDER_NAME
    }

    fn can_intra_move(&self, dest_provider: &dyn StorageProvider) -> bool {
        dest_provider.identity() == self.identity()
    }
}
