//! Per-session provider settings
//!
//! Everything an adapter instance holds: derived once from the loaded
//! configuration plus the bearer token, never mutated afterwards.

use std::fmt;

use odbridge_core::config::{ProviderConfig, DEFAULT_BASE_URL};
use odbridge_core::domain::{DomainError, RemoteId};

use crate::addressing::Addressing;

/// Immutable settings for one [`OneDriveProvider`](crate::OneDriveProvider)
#[derive(Clone)]
pub struct ProviderSettings {
    /// Drive API base URL, without a trailing slash
    pub base_url: String,
    /// Bearer token sent with every API request
    pub access_token: String,
    /// Identifier the virtual root resolves to
    pub root_id: RemoteId,
    /// Drive path prefix, honoured under path addressing only
    pub root_path: Option<String>,
    pub addressing: Addressing,
    /// `top` value for delta queries
    pub delta_page_size: u32,
}

impl ProviderSettings {
    /// Settings with default endpoint, root and strategy
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            access_token: access_token.into(),
            root_id: RemoteId::root(),
            root_path: None,
            addressing: Addressing::IdAddressed,
            delta_page_size: 250,
        }
    }

    /// Derive settings from the `provider` configuration section
    ///
    /// # Errors
    /// Returns `DomainError::InvalidRemoteId` if the configured root folder
    /// identifier is malformed
    pub fn from_config(
        config: &ProviderConfig,
        access_token: impl Into<String>,
    ) -> Result<Self, DomainError> {
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            access_token: access_token.into(),
            root_id: RemoteId::new(config.root_folder_id.clone())?,
            root_path: config.root_path.clone(),
            addressing: config.addressing.into(),
            delta_page_size: config.delta_page_size,
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_root_id(mut self, root_id: RemoteId) -> Self {
        self.root_id = root_id;
        self
    }

    pub fn with_root_path(mut self, root_path: impl Into<String>) -> Self {
        self.root_path = Some(root_path.into());
        self
    }

    pub fn with_addressing(mut self, addressing: Addressing) -> Self {
        self.addressing = addressing;
        self
    }

    pub fn with_delta_page_size(mut self, size: u32) -> Self {
        self.delta_page_size = size;
        self
    }

    /// The prepend segment attached to caller paths
    pub fn prepend(&self) -> Option<String> {
        match self.addressing {
            Addressing::PathAddressed => self
                .root_path
                .as_deref()
                .map(|p| p.trim_matches('/').to_string())
                .filter(|p| !p.is_empty()),
            Addressing::IdAddressed => None,
        }
    }
}

impl fmt::Debug for ProviderSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderSettings")
            .field("base_url", &self.base_url)
            .field("access_token", &"<redacted>")
            .field("root_id", &self.root_id)
            .field("root_path", &self.root_path)
            .field("addressing", &self.addressing)
            .field("delta_page_size", &self.delta_page_size)
            .finish()
    }
}
