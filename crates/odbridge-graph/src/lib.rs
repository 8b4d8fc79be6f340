//! odbridge Graph - OneDrive storage adapter
//!
//! Implements the [`StorageProvider`](odbridge_core::ports::StorageProvider)
//! contract against the OneDrive drive API:
//! - Path-to-identifier resolution and back
//! - Metadata normalization with soft-delete filtering
//! - Revision listing and ETag-keyed downloads through the delta feed
//! - Uploads with name-conflict handling
//! - Move/copy on top of the backend copy action
//!
//! ## Modules
//!
//! - [`addressing`] - Identifier- and path-addressed endpoint construction
//! - [`client`] - Drive API HTTP client
//! - [`item`] - Wire types for drive items
//! - [`metadata`] - Normalization into provider-agnostic records
//! - [`observer`] - Observer implementations for backend exchanges
//! - [`provider`] - The `StorageProvider` implementation
//! - [`settings`] - Immutable per-session settings

pub mod addressing;
pub mod client;
pub mod item;
pub mod metadata;
mod move_copy;
pub mod observer;
pub mod provider;
mod resolver;
mod revisions;
pub mod settings;
mod upload;

pub use addressing::{Addressing, ItemLocator};
pub use observer::{NoopObserver, TracingObserver};
pub use provider::{OneDriveProvider, PROVIDER_NAME};
pub use settings::ProviderSettings;
