//! Name conflict port
//!
//! Upload targets are checked against existing items by a shared resolver
//! so every provider applies the same replace/rename/warn semantics.

use crate::domain::{ConflictPolicy, ConflictResolution, ProviderError, VirtualPath};

use super::storage_provider::StorageProvider;

/// Settles an upload target against whatever already exists there
#[async_trait::async_trait]
pub trait NameConflictResolver: Send + Sync {
    /// Decide the final target path for an upload
    ///
    /// # Arguments
    /// * `provider` - Provider used for existence checks and sibling listings
    /// * `path` - The requested target
    /// * `policy` - Conflict policy chosen by the caller
    async fn resolve(
        &self,
        provider: &dyn StorageProvider,
        path: &VirtualPath,
        policy: &ConflictPolicy,
    ) -> Result<ConflictResolution, ProviderError>;
}
