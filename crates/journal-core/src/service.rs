//! The journal event loop.
//!
//! [`JournalService`] owns the session tracker and the flusher and runs on a
//! single task: editor events and timer ticks are handled one at a time, so
//! the tracker needs no locking. When the event channel closes or a
//! `shutdown` event arrives, every open session is force-closed and one
//! final flush is attempted.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};

use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::error::Result;
use crate::event::EditorEvent;
use crate::filter::SkipFilter;
use crate::flush::{FlushOutcome, FlushTrigger, Flusher};
use crate::history::SyncHistoryStore;
use crate::notify::{Notifier, TracingNotifier};
use crate::project::ProjectId;
use crate::session::tracker::OpenOutcome;
use crate::session::SessionTracker;
use crate::sink::build_sink;

/// Counters collected while the service runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceStats {
    /// Editor events handled
    pub events: u64,
    /// Sessions started
    pub sessions_started: u64,
    /// Opens ignored by the skip filter
    pub skipped: u64,
    /// Sessions finalized (including at shutdown)
    pub sessions_finalized: u64,
    /// Flushes accepted by the sink
    pub flushes_synced: u64,
    /// Flushes that failed
    pub flushes_failed: u64,
    /// Sessions delivered to the sink
    pub sessions_synced: u64,
}

/// Session tracking plus periodic export.
pub struct JournalService {
    tracker: SessionTracker,
    flusher: Flusher,
    interval: Duration,
    stats: ServiceStats,
}

impl JournalService {
    /// Assemble a service from its parts.
    ///
    /// The interval is clamped to between one millisecond and one week.
    #[must_use]
    pub fn new(tracker: SessionTracker, flusher: Flusher, interval: Duration) -> Self {
        let longest = Duration::from_secs(crate::MAX_SYNC_FREQUENCY_MINUTES * 60);
        Self {
            tracker,
            flusher,
            interval: interval.clamp(Duration::from_millis(1), longest),
            stats: ServiceStats::default(),
        }
    }

    /// Build a service from configuration, with wall-clock time and log notifications.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid for the chosen sink or
    /// an exclusion pattern does not compile.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::from_config_with(config, Arc::new(SystemClock), Arc::new(TracingNotifier))
    }

    /// Build a service from configuration with an explicit clock and notifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid for the chosen sink or
    /// an exclusion pattern does not compile.
    pub fn from_config_with(
        config: &Config,
        clock: Arc<dyn Clock>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self> {
        let filter = SkipFilter::new(&config.filter.exclude)?;
        let sink = build_sink(config)?;

        let mut flusher = Flusher::new(sink)
            .with_notifier(notifier)
            .with_clock(Arc::clone(&clock));

        if config.history.enabled {
            match SyncHistoryStore::load_with_config(config.history.clone()) {
                Ok(history) => flusher = flusher.with_history(history),
                Err(e) => tracing::warn!("Sync history unavailable: {e}"),
            }
        }

        let tracker = SessionTracker::with_clock(clock, filter);
        Ok(Self::new(tracker, flusher, config.sync_interval()))
    }

    /// The session tracker.
    #[must_use]
    pub fn tracker(&self) -> &SessionTracker {
        &self.tracker
    }

    /// Counters so far.
    #[must_use]
    pub fn stats(&self) -> &ServiceStats {
        &self.stats
    }

    /// Interval between periodic flushes.
    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Apply one editor event.
    ///
    /// Returns `false` when the event asks the service to stop.
    pub async fn handle(&mut self, event: EditorEvent) -> bool {
        self.stats.events += 1;
        tracing::debug!(kind = event.kind(), uri = event.uri(), "Editor event");

        match event {
            EditorEvent::Opened {
                uri,
                workspace_roots,
            } => {
                let project = ProjectId::from_workspace_roots(&workspace_roots);
                match self.tracker.open(&project, &uri) {
                    OpenOutcome::Started => self.stats.sessions_started += 1,
                    OpenOutcome::Skipped => self.stats.skipped += 1,
                    OpenOutcome::AlreadyActive => {}
                }
            }
            EditorEvent::Saved {
                uri,
                workspace_roots,
            } => {
                let project = ProjectId::from_workspace_roots(&workspace_roots);
                self.tracker.save(&project, &uri);
            }
            EditorEvent::Closed {
                uri,
                workspace_roots,
            } => {
                let project = ProjectId::from_workspace_roots(&workspace_roots);
                if self.tracker.close(&project, &uri).is_some() {
                    self.stats.sessions_finalized += 1;
                }
            }
            EditorEvent::ForceSync => {
                self.flush(FlushTrigger::Manual).await;
            }
            EditorEvent::Shutdown => return false,
        }

        true
    }

    /// Flush finalized sessions now.
    pub async fn flush(&mut self, trigger: FlushTrigger) -> FlushOutcome {
        let outcome = self.flusher.flush(&mut self.tracker, trigger).await;
        match &outcome {
            FlushOutcome::Synced { sessions } => {
                self.stats.flushes_synced += 1;
                self.stats.sessions_synced += *sessions as u64;
            }
            FlushOutcome::Failed { .. } => self.stats.flushes_failed += 1,
            FlushOutcome::Empty => {}
        }
        outcome
    }

    /// Force-close open sessions and attempt a final flush.
    pub async fn shutdown(&mut self) -> FlushOutcome {
        let closed = self.tracker.close_all();
        self.stats.sessions_finalized += closed as u64;
        tracing::info!(
            closed,
            pending = self.tracker.finalized_count(),
            "Shutting down, flushing remaining sessions"
        );
        self.flush(FlushTrigger::Shutdown).await
    }

    /// Run until the channel closes or a `shutdown` event arrives.
    pub async fn run(mut self, mut events: mpsc::Receiver<EditorEvent>) -> ServiceStats {
        let mut ticker = tokio::time::interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(
            interval_secs = self.interval.as_secs(),
            sink = self.flusher.sink_name(),
            "Activity journal started"
        );

        loop {
            tokio::select! {
                event = events.recv() => {
                    match event {
                        Some(event) => {
                            if !self.handle(event).await {
                                break;
                            }
                        }
                        None => {
                            tracing::debug!("Event channel closed");
                            break;
                        }
                    }
                }
                _ = ticker.tick() => {
                    self.flush(FlushTrigger::Interval).await;
                }
            }
        }

        self.shutdown().await;
        self.stats
    }
}

impl std::fmt::Debug for JournalService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JournalService")
            .field("tracker", &self.tracker)
            .field("flusher", &self.flusher)
            .field("interval", &self.interval)
            .field("stats", &self.stats)
            .finish()
    }
}
