//! Upload conflict policies and their outcomes

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::errors::DomainError;
use super::path::VirtualPath;

/// What to do when an upload target already exists
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ConflictPolicy {
    /// Overwrite the existing item
    #[default]
    Replace,
    /// Pick a new, unused leaf name and leave the existing item untouched
    Rename,
    /// Refuse the upload
    Warn,
    /// Any other policy name, handed to the conflict resolver untouched
    Other(String),
}

impl ConflictPolicy {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Replace => "replace",
            Self::Rename => "rename",
            Self::Warn => "warn",
            Self::Other(s) => s,
        }
    }
}

impl fmt::Display for ConflictPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConflictPolicy {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        match normalized.as_str() {
            "" => Err(DomainError::InvalidConflictPolicy(
                "policy name cannot be empty".to_string(),
            )),
            "replace" => Ok(Self::Replace),
            "rename" => Ok(Self::Rename),
            "warn" => Ok(Self::Warn),
            _ => Ok(Self::Other(normalized)),
        }
    }
}

impl TryFrom<String> for ConflictPolicy {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<ConflictPolicy> for String {
    fn from(policy: ConflictPolicy) -> Self {
        policy.as_str().to_string()
    }
}

/// How an upload target was settled against existing items
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConflictResolution {
    /// Write to the requested path; `existed` tells whether something was there
    Replace { path: VirtualPath, existed: bool },
    /// Write to a fresh sibling name; the existing item is untouched
    Rename { path: VirtualPath },
}

impl ConflictResolution {
    /// The path the content should be written to
    pub fn path(&self) -> &VirtualPath {
        match self {
            Self::Replace { path, .. } | Self::Rename { path } => path,
        }
    }

    /// Whether the final target already existed
    pub fn existed(&self) -> bool {
        match self {
            Self::Replace { existed, .. } => *existed,
            Self::Rename { .. } => false,
        }
    }

    pub fn into_path(self) -> VirtualPath {
        match self {
            Self::Replace { path, .. } | Self::Rename { path } => path,
        }
    }
}
