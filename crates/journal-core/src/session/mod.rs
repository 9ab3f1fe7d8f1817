//! File sessions.
//!
//! A session is the lifetime of one document being open in the editor: it
//! starts when the file is opened, counts saves while open, and is finalized
//! when the file is closed. Finalized sessions wait in the tracker until a
//! flush exports them.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::project::ProjectId;

pub mod tracker;

pub use tracker::SessionTracker;

/// The tracked lifetime of one open file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSession {
    /// Document URI as reported by the editor
    pub file_uri: String,
    /// When the file was opened
    pub opened_at: DateTime<Utc>,
    /// When the file was closed (None while active)
    pub closed_at: Option<DateTime<Utc>>,
    /// Number of saves recorded while open
    pub saves_count: u32,
}

impl FileSession {
    /// Start a new session for `file_uri`.
    #[must_use]
    pub fn new(file_uri: impl Into<String>, opened_at: DateTime<Utc>) -> Self {
        Self {
            file_uri: file_uri.into(),
            opened_at,
            closed_at: None,
            saves_count: 0,
        }
    }

    /// Record one save.
    pub fn record_save(&mut self) {
        self.saves_count = self.saves_count.saturating_add(1);
    }

    /// Stamp the close time.
    pub fn close(&mut self, closed_at: DateTime<Utc>) {
        self.closed_at = Some(closed_at);
    }

    /// Whether the session has been closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed_at.is_some()
    }

    /// How long the file was open, if the session is closed.
    ///
    /// Clock skew never yields a negative duration.
    #[must_use]
    pub fn duration(&self) -> Option<Duration> {
        self.closed_at
            .map(|closed| (closed - self.opened_at).max(Duration::zero()))
    }

    /// Short file name for display (last path segment of the URI).
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.file_uri
            .rsplit(['/', '\\'])
            .find(|segment| !segment.is_empty())
            .unwrap_or(&self.file_uri)
    }
}

/// A snapshot of finalized sessions, grouped by project.
///
/// Produced by [`SessionTracker::finalized_snapshot`] and handed back to
/// [`SessionTracker::acknowledge`] once a sink accepted it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalizedBatch {
    projects: BTreeMap<ProjectId, Vec<FileSession>>,
}

impl FinalizedBatch {
    /// Create an empty batch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append sessions for a project, skipping empty lists.
    pub fn insert(&mut self, project: ProjectId, sessions: Vec<FileSession>) {
        if !sessions.is_empty() {
            self.projects.entry(project).or_default().extend(sessions);
        }
    }

    /// Iterate projects in sorted order with their sessions in close order.
    pub fn projects(&self) -> impl Iterator<Item = (&ProjectId, &[FileSession])> {
        self.projects
            .iter()
            .map(|(project, sessions)| (project, sessions.as_slice()))
    }

    /// Sessions for one project.
    #[must_use]
    pub fn sessions_for(&self, project: &ProjectId) -> &[FileSession] {
        self.projects.get(project).map_or(&[], Vec::as_slice)
    }

    /// Total number of sessions in the batch.
    #[must_use]
    pub fn session_count(&self) -> usize {
        self.projects.values().map(Vec::len).sum()
    }

    /// Number of projects in the batch.
    #[must_use]
    pub fn project_count(&self) -> usize {
        self.projects.len()
    }

    /// Whether the batch holds no sessions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    /// Total saves across all sessions.
    #[must_use]
    pub fn total_saves(&self) -> u64 {
        self.projects
            .values()
            .flatten()
            .map(|s| u64::from(s.saves_count))
            .sum()
    }
}
