//! Project identification.
//!
//! Sessions are grouped by the workspace root that was active when the event
//! happened. Editors without an open folder report no roots at all; those
//! sessions are grouped under [`NO_ROOT_PROJECT_ID`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::NO_ROOT_PROJECT_ID;

/// Identifier of the project a session belongs to.
#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(String);

impl ProjectId {
    /// Create a project id from a raw string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The sentinel id used when no workspace root is available.
    #[must_use]
    pub fn no_root() -> Self {
        Self(NO_ROOT_PROJECT_ID.to_string())
    }

    /// Derive the project id from an optional workspace root URI.
    ///
    /// An empty or whitespace-only root is treated as absent.
    #[must_use]
    pub fn from_workspace_root(root: Option<&str>) -> Self {
        match root.map(str::trim) {
            Some(root) if !root.is_empty() => Self(root.to_string()),
            _ => Self::no_root(),
        }
    }

    /// Derive the project id from the workspace roots, using the first one.
    #[must_use]
    pub fn from_workspace_roots<S: AsRef<str>>(roots: &[S]) -> Self {
        Self::from_workspace_root(roots.first().map(AsRef::as_ref))
    }

    /// Whether this is the no-root sentinel.
    #[must_use]
    pub fn is_sentinel(&self) -> bool {
        self.0 == NO_ROOT_PROJECT_ID
    }

    /// Get the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
