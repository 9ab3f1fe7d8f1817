//! Session bookkeeping.
//!
//! The tracker keeps two stores:
//!
//! - **active**: project -> file URI -> open session
//! - **finalized**: project -> closed sessions, in close order
//!
//! A file URI is active at most once per project. Closing moves the session
//! from the active store to the finalized store; a successful flush removes
//! it from the finalized store.

use std::collections::HashMap;
use std::sync::Arc;

use super::{FileSession, FinalizedBatch};
use crate::clock::{Clock, SystemClock};
use crate::filter::SkipFilter;
use crate::project::ProjectId;

/// Result of handling a file-open event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenOutcome {
    /// A new session was started
    Started,
    /// The file was already open in this project
    AlreadyActive,
    /// The file matched the skip predicate
    Skipped,
}

/// Tracks open and finalized file sessions per project.
pub struct SessionTracker {
    active: HashMap<ProjectId, HashMap<String, FileSession>>,
    finalized: HashMap<ProjectId, Vec<FileSession>>,
    filter: SkipFilter,
    clock: Arc<dyn Clock>,
}

impl SessionTracker {
    /// Create a tracker using wall-clock time and the built-in skip rules.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock), SkipFilter::default())
    }

    /// Create a tracker with an explicit clock and skip filter.
    #[must_use]
    pub fn with_clock(clock: Arc<dyn Clock>, filter: SkipFilter) -> Self {
        Self {
            active: HashMap::new(),
            finalized: HashMap::new(),
            filter,
            clock,
        }
    }

    /// Start a session for `uri` in `project`.
    pub fn open(&mut self, project: &ProjectId, uri: &str) -> OpenOutcome {
        if self.filter.is_skipped(uri) {
            tracing::debug!(uri, "Skipping version-control or excluded document");
            return OpenOutcome::Skipped;
        }

        let files = self.active.entry(project.clone()).or_default();
        if files.contains_key(uri) {
            tracing::debug!(uri, project = %project, "File already open, keeping session");
            return OpenOutcome::AlreadyActive;
        }

        files.insert(uri.to_string(), FileSession::new(uri, self.clock.now()));
        tracing::debug!(uri, project = %project, "Session started");
        OpenOutcome::Started
    }

    /// Count a save for the active session of `uri`, if any.
    ///
    /// Returns whether a session was updated.
    pub fn save(&mut self, project: &ProjectId, uri: &str) -> bool {
        match self
            .active
            .get_mut(project)
            .and_then(|files| files.get_mut(uri))
        {
            Some(session) => {
                session.record_save();
                tracing::debug!(uri, saves = session.saves_count, "Save recorded");
                true
            }
            None => {
                tracing::debug!(uri, project = %project, "Save for untracked file ignored");
                false
            }
        }
    }

    /// Close the active session of `uri` and move it to the finalized store.
    ///
    /// Returns the finalized session, or `None` if the file was not tracked.
    pub fn close(&mut self, project: &ProjectId, uri: &str) -> Option<FileSession> {
        let files = self.active.get_mut(project)?;
        let mut session = files.remove(uri)?;
        if files.is_empty() {
            self.active.remove(project);
        }

        session.close(self.clock.now());
        tracing::debug!(
            uri,
            project = %project,
            saves = session.saves_count,
            "Session finalized"
        );

        self.finalized
            .entry(project.clone())
            .or_default()
            .push(session.clone());
        Some(session)
    }

    /// Force-close every active session, stamping the current time.
    ///
    /// Returns the number of sessions finalized.
    pub fn close_all(&mut self) -> usize {
        let now = self.clock.now();
        let mut closed = 0;

        for (project, files) in self.active.drain() {
            let mut sessions: Vec<FileSession> = files.into_values().collect();
            sessions.sort_by(|a, b| {
                a.opened_at
                    .cmp(&b.opened_at)
                    .then_with(|| a.file_uri.cmp(&b.file_uri))
            });

            for session in &mut sessions {
                session.close(now);
            }
            closed += sessions.len();
            self.finalized.entry(project).or_default().extend(sessions);
        }

        if closed > 0 {
            tracing::debug!(closed, "Force-closed remaining sessions");
        }
        closed
    }

    /// Copy the finalized store into a batch for export.
    #[must_use]
    pub fn finalized_snapshot(&self) -> FinalizedBatch {
        let mut batch = FinalizedBatch::new();
        for (project, sessions) in &self.finalized {
            batch.insert(project.clone(), sessions.clone());
        }
        batch
    }

    /// Remove the sessions of an exported batch from the finalized store.
    ///
    /// Only the oldest `n` sessions of each project are removed, where `n` is
    /// the number the batch held for that project. Sessions finalized after
    /// the snapshot was taken stay queued.
    pub fn acknowledge(&mut self, batch: &FinalizedBatch) {
        for (project, sessions) in batch.projects() {
            if let Some(pending) = self.finalized.get_mut(project) {
                let n = sessions.len().min(pending.len());
                pending.drain(..n);
                if pending.is_empty() {
                    self.finalized.remove(project);
                }
            }
        }
    }

    /// Drop all finalized sessions.
    pub fn clear_finalized(&mut self) {
        self.finalized.clear();
    }

    /// Whether any session is waiting for export.
    #[must_use]
    pub fn has_finalized(&self) -> bool {
        !self.finalized.is_empty()
    }

    /// Number of sessions waiting for export.
    #[must_use]
    pub fn finalized_count(&self) -> usize {
        self.finalized.values().map(Vec::len).sum()
    }

    /// Number of currently open sessions.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.active.values().map(HashMap::len).sum()
    }

    /// Look up an active session.
    #[must_use]
    pub fn active_session(&self, project: &ProjectId, uri: &str) -> Option<&FileSession> {
        self.active.get(project).and_then(|files| files.get(uri))
    }

    /// Finalized sessions of one project, in close order.
    #[must_use]
    pub fn finalized_for(&self, project: &ProjectId) -> &[FileSession] {
        self.finalized.get(project).map_or(&[], Vec::as_slice)
    }
}

impl Default for SessionTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SessionTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionTracker")
            .field("active", &self.active_count())
            .field("finalized", &self.finalized_count())
            .finish_non_exhaustive()
    }
}
