//! odbridge Core - Domain types and provider ports
//!
//! This crate contains the transport-free half of the adapter:
//! - **Domain types** - `VirtualPath`, `RemoteId`, `ETag`, normalized
//!   metadata, revisions, conflict policies, transfer outcomes and errors
//! - **Port definitions** - `StorageProvider`, `NameConflictResolver`,
//!   `ProviderObserver`
//! - **Configuration** - YAML configuration with validation and a builder
//!
//! # Architecture
//!
//! Ports define trait interfaces that adapter crates implement. The domain
//! module has no knowledge of HTTP; the OneDrive adapter lives in
//! `odbridge-graph`.

pub mod config;
pub mod domain;
pub mod ports;
