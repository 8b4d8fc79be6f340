//! Virtual hierarchical paths
//!
//! A [`VirtualPath`] is the address callers use: an ordered list of name
//! segments with a parallel list of remote identifiers. Segment 0 is always
//! the root (empty name). Identifiers may be unknown (`None`) for segments
//! the backend did not report or that do not exist yet.
//!
//! Parent and leaf information is structural: [`VirtualPath::parent`],
//! [`VirtualPath::name`] and [`VirtualPath::parent_reference`] never slice
//! strings.

use std::fmt::{self, Display, Formatter};

use super::errors::DomainError;
use super::newtypes::RemoteId;

/// How to address the parent of a path in a backend request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParentRef {
    /// The parent's identifier is known
    Id(RemoteId),
    /// The parent is unresolved; its own leaf segment is used verbatim
    Literal(String),
}

/// A path in the virtual hierarchy exposed to callers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualPath {
    names: Vec<String>,
    ids: Vec<Option<RemoteId>>,
    is_folder: bool,
    prepend: Option<String>,
}

impl VirtualPath {
    /// The root path, resolved to the configured root folder
    #[must_use]
    pub fn root(root_id: RemoteId) -> Self {
        Self {
            names: vec![String::new()],
            ids: vec![Some(root_id)],
            is_folder: true,
            prepend: None,
        }
    }

    /// Parse a caller-supplied path string
    ///
    /// A trailing `/` marks a folder. Only the root segment carries an
    /// identifier; every other segment is unresolved.
    ///
    /// # Errors
    /// Returns `DomainError::InvalidPath` if the path is not absolute or
    /// contains empty, `.` or `..` segments
    pub fn parse(raw: &str, root_id: RemoteId) -> Result<Self, DomainError> {
        if !raw.starts_with('/') {
            return Err(DomainError::InvalidPath(format!(
                "Path must start with '/': {raw}"
            )));
        }

        let is_folder = raw.ends_with('/');
        let trimmed = raw.trim_matches('/');

        let mut path = Self::root(root_id);
        path.is_folder = is_folder;
        if trimmed.is_empty() {
            path.is_folder = true;
            return Ok(path);
        }

        for segment in trimmed.split('/') {
            validate_segment(segment, raw)?;
            path.names.push(segment.to_string());
            path.ids.push(None);
        }

        Ok(path)
    }

    /// Build a path from a full name chain and a parallel identifier chain
    ///
    /// Both chains include the root segment at index 0.
    ///
    /// # Errors
    /// Returns `DomainError::InvalidPath` if the chains differ in length, are
    /// empty, or a non-root segment is invalid
    pub fn from_parts(
        names: Vec<String>,
        ids: Vec<Option<RemoteId>>,
        is_folder: bool,
    ) -> Result<Self, DomainError> {
        if names.is_empty() || names.len() != ids.len() {
            return Err(DomainError::InvalidPath(format!(
                "{} names cannot align with {} identifiers",
                names.len(),
                ids.len()
            )));
        }
        if !names[0].is_empty() {
            return Err(DomainError::InvalidPath(
                "First segment must be the root".to_string(),
            ));
        }
        for name in &names[1..] {
            validate_segment(name, name)?;
        }

        Ok(Self {
            is_folder: is_folder || names.len() == 1,
            names,
            ids,
            prepend: None,
        })
    }

    /// Attach the configured root prefix used for path-addressed requests
    #[must_use]
    pub fn with_prepend(mut self, prepend: Option<String>) -> Self {
        self.prepend = prepend
            .map(|p| p.trim_matches('/').to_string())
            .filter(|p| !p.is_empty());
        self
    }

    pub fn is_root(&self) -> bool {
        self.names.len() == 1
    }

    pub fn is_folder(&self) -> bool {
        self.is_folder
    }

    pub fn is_file(&self) -> bool {
        !self.is_folder
    }

    /// The leaf name (empty for the root)
    pub fn name(&self) -> &str {
        self.names.last().map(String::as_str).unwrap_or_default()
    }

    /// The leaf identifier, if resolved
    pub fn identifier(&self) -> Option<&RemoteId> {
        self.ids.last().and_then(Option::as_ref)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn ids(&self) -> &[Option<RemoteId>] {
        &self.ids
    }

    /// Number of segments, root included
    pub fn segment_count(&self) -> usize {
        self.names.len()
    }

    pub fn prepend(&self) -> Option<&str> {
        self.prepend.as_deref()
    }

    /// The containing folder, or `None` for the root
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        if self.is_root() {
            return None;
        }
        let keep = self.names.len() - 1;
        Some(Self {
            names: self.names[..keep].to_vec(),
            ids: self.ids[..keep].to_vec(),
            is_folder: true,
            prepend: self.prepend.clone(),
        })
    }

    /// How the parent should be referenced in a backend request
    ///
    /// Uses the parent's identifier when resolved, otherwise the parent's
    /// own leaf segment as a literal reference.
    pub fn parent_reference(&self) -> Option<ParentRef> {
        let parent = self.parent()?;
        match parent.identifier() {
            Some(id) => Some(ParentRef::Id(id.clone())),
            None => Some(ParentRef::Literal(parent.name().to_string())),
        }
    }

    /// A child of this folder, unresolved
    ///
    /// # Errors
    /// Returns `DomainError::InvalidPath` if `name` is not a valid segment
    pub fn child(&self, name: &str, is_folder: bool) -> Result<Self, DomainError> {
        validate_segment(name, name)?;
        let mut child = self.clone();
        child.names.push(name.to_string());
        child.ids.push(None);
        child.is_folder = is_folder;
        Ok(child)
    }

    /// A sibling with a different leaf name; the leaf identifier is cleared
    ///
    /// # Errors
    /// Returns `DomainError::InvalidPath` for the root or an invalid name
    pub fn with_name(&self, name: &str) -> Result<Self, DomainError> {
        let parent = self.parent().ok_or_else(|| {
            DomainError::InvalidPath("The root path cannot be renamed".to_string())
        })?;
        parent.child(name, self.is_folder)
    }

    /// The path as displayed to callers, e.g. `/Documents/report.docx`
    pub fn materialized(&self) -> String {
        if self.is_root() {
            return "/".to_string();
        }
        let mut out = String::new();
        for name in &self.names[1..] {
            out.push('/');
            out.push_str(name);
        }
        if self.is_folder {
            out.push('/');
        }
        out
    }

    /// The drive-relative path including the configured prefix, without a
    /// trailing separator (`/` for the root without prefix)
    pub fn full_path(&self) -> String {
        let mut out = String::new();
        if let Some(prefix) = &self.prepend {
            out.push('/');
            out.push_str(prefix);
        }
        for name in &self.names[1..] {
            out.push('/');
            out.push_str(name);
        }
        if out.is_empty() {
            out.push('/');
        }
        out
    }

    /// True when `other` names the same location except for the letter case
    /// of the final segment
    pub fn differs_only_in_case(&self, other: &Self) -> bool {
        if self.is_root() || other.is_root() || self.names.len() != other.names.len() {
            return false;
        }
        let last = self.names.len() - 1;
        if self.names[..last] != other.names[..last] {
            return false;
        }
        let (a, b) = (&self.names[last], &other.names[last]);
        a != b && a.to_lowercase() == b.to_lowercase()
    }
}

impl Display for VirtualPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.materialized())
    }
}

fn validate_segment(segment: &str, context: &str) -> Result<(), DomainError> {
    if segment.is_empty() || segment == "." || segment == ".." || segment.contains('/') {
        return Err(DomainError::InvalidPath(format!(
            "Invalid path segment {segment:?} in {context}"
        )));
    }
    Ok(())
}
