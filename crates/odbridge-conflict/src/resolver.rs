//! Default name-conflict resolver
//!
//! Settles an upload target against the items already in its parent folder:
//! - `Replace`: write to the requested path, reporting whether it existed
//! - `Rename`: on collision, pick the first free `name (n).ext` sibling
//! - `Warn`: on collision, refuse with `NamingConflict`
//! - any other policy: refuse on collision, otherwise write as requested
//!
//! Names are compared case-insensitively since the backend does not allow
//! siblings that differ only in case.

use std::collections::HashSet;

use async_trait::async_trait;
use tracing::{debug, info};

use odbridge_core::{
    domain::{ConflictPolicy, ConflictResolution, MetadataResult, ProviderError, VirtualPath},
    ports::{NameConflictResolver, StorageProvider},
};

use crate::namer::{SiblingNamer, MAX_ATTEMPTS};

/// Resolver backed by the provider's own metadata lookups
#[derive(Debug, Default, Clone, Copy)]
pub struct SiblingConflictResolver;

impl SiblingConflictResolver {
    pub fn new() -> Self {
        Self
    }

    /// Lower-cased names of the items next to `path`
    ///
    /// A missing parent folder has no siblings.
    async fn sibling_names(
        &self,
        provider: &dyn StorageProvider,
        path: &VirtualPath,
    ) -> Result<HashSet<String>, ProviderError> {
        let Some(parent) = path.parent() else {
            return Ok(HashSet::new());
        };

        match provider.metadata(&parent).await {
            Ok(MetadataResult::Listing(entries)) => Ok(entries
                .iter()
                .map(|entry| entry.name().to_lowercase())
                .collect()),
            Ok(MetadataResult::File(file)) => Err(ProviderError::InvalidPath(format!(
                "Parent '{}' of '{path}' is a file",
                file.path
            ))),
            Err(e) if e.is_not_found() => Ok(HashSet::new()),
            Err(e) => Err(e),
        }
    }

    /// Whether an item already sits at `path`
    ///
    /// A resolved leaf is checked directly; an unresolved one against the
    /// parent's listing.
    async fn target_exists(
        &self,
        provider: &dyn StorageProvider,
        path: &VirtualPath,
        siblings: Option<&HashSet<String>>,
    ) -> Result<bool, ProviderError> {
        if path.identifier().is_some() {
            return provider.exists(path).await;
        }
        match siblings {
            Some(names) => Ok(names.contains(&path.name().to_lowercase())),
            None => Ok(self
                .sibling_names(provider, path)
                .await?
                .contains(&path.name().to_lowercase())),
        }
    }

    async fn rename(
        &self,
        provider: &dyn StorageProvider,
        path: &VirtualPath,
    ) -> Result<ConflictResolution, ProviderError> {
        let siblings = self.sibling_names(provider, path).await?;
        if !self.target_exists(provider, path, Some(&siblings)).await? {
            return Ok(ConflictResolution::Replace {
                path: path.clone(),
                existed: false,
            });
        }

        let name = SiblingNamer::generate_unique(path.name(), |candidate| {
            siblings.contains(&candidate.to_lowercase())
        })
        .ok_or_else(|| {
            ProviderError::NamingConflict(format!(
                "No free name for '{path}' after {MAX_ATTEMPTS} attempts"
            ))
        })?;

        let renamed = path
            .with_name(&name)
            .map_err(|e| ProviderError::InvalidPath(e.to_string()))?;
        info!(requested = %path, renamed = %renamed, "Upload target renamed");
        Ok(ConflictResolution::Rename { path: renamed })
    }
}

#[async_trait]
impl NameConflictResolver for SiblingConflictResolver {
    async fn resolve(
        &self,
        provider: &dyn StorageProvider,
        path: &VirtualPath,
        policy: &ConflictPolicy,
    ) -> Result<ConflictResolution, ProviderError> {
        debug!(path = %path, policy = %policy, "Resolving upload target");

        if path.is_root() {
            return Err(ProviderError::InvalidPath(
                "The root folder cannot be an upload target".to_string(),
            ));
        }

        match policy {
            ConflictPolicy::Replace => {
                let existed = self.target_exists(provider, path, None).await?;
                Ok(ConflictResolution::Replace {
                    path: path.clone(),
                    existed,
                })
            }
            ConflictPolicy::Rename => self.rename(provider, path).await,
            ConflictPolicy::Warn | ConflictPolicy::Other(_) => {
                if self.target_exists(provider, path, None).await? {
                    return Err(ProviderError::NamingConflict(format!(
                        "'{path}' already exists (policy '{policy}')"
                    )));
                }
                Ok(ConflictResolution::Replace {
                    path: path.clone(),
                    existed: false,
                })
            }
        }
    }
}
