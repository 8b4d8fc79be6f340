//! File upload with name-conflict handling
//!
//! The target is settled by the shared [`NameConflictResolver`] first; the
//! content then goes to `{parent}/children/{name}/content` in one request.

use odbridge_core::domain::{
    ConflictPolicy, FileMetadata, Operation, ProviderError, UploadStream, VirtualPath,
};
use odbridge_core::ports::{NameConflictResolver, StorageProvider};
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::{Body, Method, StatusCode};
use tracing::{debug, info};

use crate::client::read_json;
use crate::metadata::parent_hint;
use crate::provider::Backend;

pub(crate) struct UploadConflictHandler<'a> {
    backend: Backend<'a>,
    conflicts: &'a dyn NameConflictResolver,
}

impl<'a> UploadConflictHandler<'a> {
    pub(crate) fn new(backend: Backend<'a>, conflicts: &'a dyn NameConflictResolver) -> Self {
        Self { backend, conflicts }
    }

    /// Uploads `stream` to `path` under `policy`
    ///
    /// # Returns
    /// The stored file's metadata and whether it is new (the inverse of the
    /// resolver's "existed" flag)
    ///
    /// # Errors
    /// - `ProviderError::InvalidPath` if `path` denotes a folder
    /// - Whatever the conflict resolver raises (e.g. `NamingConflict`)
    /// - `ProviderError::Upload` for any status other than 201
    pub(crate) async fn upload(
        &self,
        provider: &dyn StorageProvider,
        stream: UploadStream,
        path: &VirtualPath,
        policy: &ConflictPolicy,
    ) -> Result<(FileMetadata, bool), ProviderError> {
        if path.is_folder() {
            return Err(ProviderError::InvalidPath(format!(
                "Cannot upload content to folder path '{path}'"
            )));
        }

        let resolution = self.conflicts.resolve(provider, path, policy).await?;
        let existed = resolution.existed();
        let target = resolution.into_path();
        if target.name() != path.name() {
            info!(requested = %path, target = %target, "Upload renamed to avoid conflict");
        }

        let settings = self.backend.settings;
        let client = self.backend.client;
        let parent = settings
            .addressing
            .parent_locator(&target, &settings.root_id)?;
        let url = parent.endpoint_with(&format!(
            "children/{}/content",
            urlencoding::encode(target.name())
        ));

        debug!(path = %target, size = stream.size, existed, "Uploading file");
        let builder = client
            .request(Method::PUT, &url)
            .header(CONTENT_TYPE, "application/octet-stream")
            .header(CONTENT_LENGTH, stream.size)
            .body(Body::wrap_stream(stream.stream));

        let response = client
            .send(Operation::Upload, builder, &[StatusCode::CREATED])
            .await?;

        let hint = parent_hint(&target);
        let metadata = self
            .backend
            .normalizer
            .file(read_json(response).await?, hint.as_deref())?;
        Ok((metadata, !existed))
    }
}
