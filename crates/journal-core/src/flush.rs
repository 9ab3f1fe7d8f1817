//! Export of finalized sessions.
//!
//! A flush snapshots the finalized store, renders a [`JournalReport`] and
//! hands it to the configured sink. Only an accepted report removes sessions
//! from the tracker; on failure the user is notified and the sessions stay
//! queued for the next attempt.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::clock::{Clock, SystemClock};
use crate::error::Error;
use crate::history::{SyncHistoryEntry, SyncHistoryStore};
use crate::notify::{Notifier, TracingNotifier};
use crate::report::JournalReport;
use crate::session::SessionTracker;
use crate::sink::SessionSink;

/// What started a flush.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlushTrigger {
    /// Periodic timer tick
    Interval,
    /// Explicit request from the user
    Manual,
    /// Final flush before exit
    Shutdown,
}

impl fmt::Display for FlushTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Interval => write!(f, "Interval"),
            Self::Manual => write!(f, "Manual"),
            Self::Shutdown => write!(f, "Shutdown"),
        }
    }
}

/// Result of one flush.
#[derive(Debug)]
pub enum FlushOutcome {
    /// Nothing was waiting; the sink was not called
    Empty,
    /// The sink accepted the report
    Synced {
        /// Sessions delivered
        sessions: usize,
    },
    /// The sink failed; sessions remain queued
    Failed {
        /// Why the sink failed
        error: Error,
    },
}

impl FlushOutcome {
    /// Whether the sink accepted a report.
    #[must_use]
    pub fn is_synced(&self) -> bool {
        matches!(self, Self::Synced { .. })
    }

    /// Whether the sink failed.
    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// Delivers finalized sessions to a sink.
pub struct Flusher {
    sink: Box<dyn SessionSink>,
    notifier: Arc<dyn Notifier>,
    history: Option<SyncHistoryStore>,
    clock: Arc<dyn Clock>,
}

impl Flusher {
    /// Create a flusher that reports through the log.
    #[must_use]
    pub fn new(sink: Box<dyn SessionSink>) -> Self {
        Self {
            sink,
            notifier: Arc::new(TracingNotifier),
            history: None,
            clock: Arc::new(SystemClock),
        }
    }

    /// Use a custom notifier.
    #[must_use]
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Record attempts in a history store.
    #[must_use]
    pub fn with_history(mut self, history: SyncHistoryStore) -> Self {
        self.history = Some(history);
        self
    }

    /// Use a custom clock for report timestamps.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Name of the underlying sink.
    #[must_use]
    pub fn sink_name(&self) -> &str {
        self.sink.name()
    }

    /// Export everything finalized in `tracker`.
    pub async fn flush(
        &mut self,
        tracker: &mut SessionTracker,
        trigger: FlushTrigger,
    ) -> FlushOutcome {
        if !tracker.has_finalized() {
            tracing::debug!(%trigger, "Nothing to sync");
            if trigger == FlushTrigger::Manual {
                self.notifier.info("No activities to sync.");
            }
            return FlushOutcome::Empty;
        }

        let batch = tracker.finalized_snapshot();
        let report = JournalReport::from_batch(&batch, self.clock.now());
        let sessions = batch.session_count();
        let entry = SyncHistoryEntry::new(
            report.id,
            trigger,
            self.sink.name(),
            sessions,
            batch.project_count(),
        )
        .at(report.generated_at);

        match self.sink.push(&report).await {
            Ok(()) => {
                tracker.acknowledge(&batch);
                tracing::info!(
                    %trigger,
                    sink = self.sink.name(),
                    sessions,
                    projects = batch.project_count(),
                    "Journal synced"
                );
                if trigger == FlushTrigger::Manual {
                    self.notifier
                        .info(&format!("Activities synced ({sessions} session(s))."));
                }
                self.record(entry);
                FlushOutcome::Synced { sessions }
            }
            Err(error) => {
                tracing::warn!(
                    %trigger,
                    sink = self.sink.name(),
                    pending = sessions,
                    error = %error,
                    "Journal sync failed, keeping sessions for retry"
                );
                let message = error.suggestion().map_or_else(
                    || format!("Activity Journal sync failed: {error}"),
                    |hint| format!("Activity Journal sync failed: {error}\n{hint}"),
                );
                self.notifier.error(&message);
                self.record(entry.with_error(error.to_string()));
                FlushOutcome::Failed { error }
            }
        }
    }

    fn record(&mut self, entry: SyncHistoryEntry) {
        if let Some(history) = self.history.as_mut() {
            if let Err(e) = history.add(entry) {
                tracing::warn!("Failed to record sync history: {e}");
            }
        }
    }
}

impl fmt::Debug for Flusher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Flusher")
            .field("sink", &self.sink.name())
            .field("history", &self.history.is_some())
            .finish_non_exhaustive()
    }
}
