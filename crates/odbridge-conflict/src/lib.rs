//! odbridge Conflict - Upload name-conflict resolution
//!
//! Provides:
//! - Existence pre-checks before an upload is issued
//! - "name (n).ext" sibling naming for the rename policy
//! - The default [`NameConflictResolver`](odbridge_core::ports::NameConflictResolver)
//!   shared by every provider

pub mod namer;
pub mod resolver;

pub use namer::SiblingNamer;
pub use resolver::SiblingConflictResolver;
