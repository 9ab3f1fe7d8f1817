//! Skip predicate for documents that should never be tracked.
//!
//! Editors open plenty of documents that are not user files: repository
//! metadata (`.git/index`, `COMMIT_EDITMSG`), virtual `git:` documents used by
//! diff views and `*.git` shadow documents. These are always skipped. Users
//! can add their own glob patterns on top through `[filter] exclude`.

use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::error::{Error, Result};

/// Directory names holding version-control metadata.
const VCS_DIRS: &[&str] = &[".git", ".hg", ".svn"];

/// URI schemes editors use for version-control virtual documents.
const VCS_SCHEMES: &[&str] = &["git:", "gitfs:"];

/// Decides which document URIs are ignored by the session tracker.
#[derive(Debug, Clone)]
pub struct SkipFilter {
    patterns: Vec<String>,
    set: GlobSet,
}

impl SkipFilter {
    /// Create a filter with the built-in rules and extra glob patterns.
    ///
    /// # Errors
    ///
    /// Returns an error if any pattern is not a valid glob.
    pub fn new(patterns: &[String]) -> Result<Self> {
        let mut builder = GlobSetBuilder::new();

        for pattern in patterns {
            let glob = Glob::new(pattern).map_err(|e| Error::InvalidPattern {
                pattern: pattern.clone(),
                reason: e.to_string(),
            })?;
            builder.add(glob);
        }

        let set = builder
            .build()
            .map_err(|e| Error::Internal(format!("Failed to build glob set: {e}")))?;

        Ok(Self {
            patterns: patterns.to_vec(),
            set,
        })
    }

    /// Whether a document URI or path should be ignored.
    #[must_use]
    pub fn is_skipped(&self, uri: &str) -> bool {
        if is_vcs_metadata(uri) {
            return true;
        }

        !self.patterns.is_empty() && self.set.is_match(strip_file_scheme(uri))
    }

    /// The user-supplied exclusion patterns.
    #[must_use]
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }
}

impl Default for SkipFilter {
    fn default() -> Self {
        Self {
            patterns: Vec::new(),
            set: GlobSet::empty(),
        }
    }
}

/// Whether the URI points into, or is derived from, version-control metadata.
#[must_use]
pub fn is_vcs_metadata(uri: &str) -> bool {
    let lower = uri.to_ascii_lowercase();
    if VCS_SCHEMES.iter().any(|scheme| lower.starts_with(scheme)) {
        return true;
    }

    let path = strip_file_scheme(uri).replace('\\', "/");
    if path.ends_with(".git") {
        return true;
    }

    path.split('/').any(|component| VCS_DIRS.contains(&component))
}

fn strip_file_scheme(uri: &str) -> &str {
    uri.strip_prefix("file://").unwrap_or(uri)
}
