//! Editor events received from the host.
//!
//! The host adapter (an editor extension, a script, or the `journal run`
//! command reading stdin) serializes editor callbacks as JSON objects, one per
//! line:
//!
//! ```json
//! {"event":"opened","uri":"file:///app/src/main.rs","workspace_roots":["file:///app"]}
//! {"event":"saved","uri":"file:///app/src/main.rs","workspace_roots":["file:///app"]}
//! {"event":"closed","uri":"file:///app/src/main.rs","workspace_roots":["file:///app"]}
//! {"event":"force_sync"}
//! {"event":"shutdown"}
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::project::ProjectId;

/// An event forwarded by the editor host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EditorEvent {
    /// A document was opened
    Opened {
        /// Document URI
        uri: String,
        /// Workspace roots at the time of the event
        #[serde(default)]
        workspace_roots: Vec<String>,
    },
    /// A document was saved
    Saved {
        /// Document URI
        uri: String,
        /// Workspace roots at the time of the event
        #[serde(default)]
        workspace_roots: Vec<String>,
    },
    /// A document was closed
    Closed {
        /// Document URI
        uri: String,
        /// Workspace roots at the time of the event
        #[serde(default)]
        workspace_roots: Vec<String>,
    },
    /// The user asked for an immediate sync
    ForceSync,
    /// The host is shutting down
    Shutdown,
}

impl EditorEvent {
    /// Decode one JSON line.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidEvent`] if the line is not a known event.
    pub fn parse_line(line: &str) -> Result<Self> {
        serde_json::from_str(line.trim()).map_err(|e| Error::InvalidEvent(e.to_string()))
    }

    /// Encode as one JSON line (without trailing newline).
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_line(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Project the event belongs to, for document events.
    #[must_use]
    pub fn project(&self) -> Option<ProjectId> {
        match self {
            Self::Opened {
                workspace_roots, ..
            }
            | Self::Saved {
                workspace_roots, ..
            }
            | Self::Closed {
                workspace_roots, ..
            } => Some(ProjectId::from_workspace_roots(workspace_roots)),
            Self::ForceSync | Self::Shutdown => None,
        }
    }

    /// Document URI, for document events.
    #[must_use]
    pub fn uri(&self) -> Option<&str> {
        match self {
            Self::Opened { uri, .. } | Self::Saved { uri, .. } | Self::Closed { uri, .. } => {
                Some(uri)
            }
            Self::ForceSync | Self::Shutdown => None,
        }
    }

    /// Fill in workspace roots for document events that carry none.
    ///
    /// Used by hosts that know the workspace once, up front.
    #[must_use]
    pub fn with_default_roots(mut self, roots: &[String]) -> Self {
        match &mut self {
            Self::Opened {
                workspace_roots, ..
            }
            | Self::Saved {
                workspace_roots, ..
            }
            | Self::Closed {
                workspace_roots, ..
            } if workspace_roots.is_empty() => {
                workspace_roots.extend_from_slice(roots);
            }
            _ => {}
        }
        self
    }

    /// Short name of the event kind, for logs.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Opened { .. } => "opened",
            Self::Saved { .. } => "saved",
            Self::Closed { .. } => "closed",
            Self::ForceSync => "force_sync",
            Self::Shutdown => "shutdown",
        }
    }
}
