//! Sibling naming for rename-on-conflict uploads
//!
//! Generates names following the pattern `stem (n).ext`, starting at 1.

/// Upper bound on numbered candidates before giving up
pub const MAX_ATTEMPTS: u32 = 999;

/// Generates unused sibling names
pub struct SiblingNamer;

impl SiblingNamer {
    /// Numbered variant of a name
    ///
    /// Given "report.docx" and 2, produces "report (2).docx". Dot-files and
    /// names without an extension get the suffix at the end.
    pub fn numbered(original_name: &str, n: u32) -> String {
        match original_name.rfind('.') {
            Some(dot_pos) if dot_pos > 0 => {
                let stem = &original_name[..dot_pos];
                let ext = &original_name[dot_pos..];
                format!("{stem} ({n}){ext}")
            }
            _ => format!("{original_name} ({n})"),
        }
    }

    /// First numbered variant for which `exists` returns false
    ///
    /// Returns `None` once [`MAX_ATTEMPTS`] candidates are taken.
    pub fn generate_unique<F>(original_name: &str, mut exists: F) -> Option<String>
    where
        F: FnMut(&str) -> bool,
    {
        (1..=MAX_ATTEMPTS)
            .map(|n| Self::numbered(original_name, n))
            .find(|candidate| !exists(candidate))
    }
}
