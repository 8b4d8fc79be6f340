//! Port definitions (hexagonal architecture interfaces)
//!
//! This module defines the port traits that form the boundaries between the
//! host abstraction layer and backend adapters.
//!
//! ## Ports Overview
//!
//! - [`StorageProvider`] - The uniform contract every backend adapter presents
//! - [`NameConflictResolver`] - Shared upload name-conflict handling
//! - [`ProviderObserver`] - Structured, injected observability hooks

pub mod name_conflict;
pub mod observer;
pub mod storage_provider;

pub use name_conflict::NameConflictResolver;
pub use observer::{ProviderObserver, RequestEvent, ResponseEvent};
pub use storage_provider::{ProviderIdentity, StorageProvider};
