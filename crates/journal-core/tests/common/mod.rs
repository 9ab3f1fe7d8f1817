//! Common test utilities for `journal-core` integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use journal_core::event::EditorEvent;
use journal_core::report::JournalReport;
use journal_core::sink::SessionSink;
use journal_core::{Error, Result};

/// Workspace root used by most tests.
pub const ROOT: &str = "file:///home/dev/app";

/// A fixed point in time to start manual clocks from.
pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 8, 1, 9, 0, 0).unwrap()
}

/// Sink that keeps every accepted report and can be told to fail.
#[derive(Clone, Default)]
pub struct RecordingSink {
    reports: Arc<Mutex<Vec<JournalReport>>>,
    attempts: Arc<AtomicUsize>,
    fail: Arc<AtomicBool>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent pushes fail (or succeed again).
    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Number of push calls, successful or not.
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Reports accepted so far.
    pub fn reports(&self) -> Vec<JournalReport> {
        self.reports.lock().unwrap().clone()
    }

    /// URIs of every accepted session, in report order.
    pub fn synced_uris(&self) -> Vec<String> {
        self.reports()
            .iter()
            .flat_map(|r| r.projects.iter())
            .flat_map(|p| p.sessions.iter().map(|s| s.file_uri.clone()))
            .collect()
    }
}

#[async_trait]
impl SessionSink for RecordingSink {
    fn name(&self) -> &str {
        "recording"
    }

    async fn push(&self, report: &JournalReport) -> Result<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(Error::Network("connection refused".to_string()));
        }
        self.reports.lock().unwrap().push(report.clone());
        Ok(())
    }
}

pub fn opened(uri: &str) -> EditorEvent {
    EditorEvent::Opened {
        uri: uri.to_string(),
        workspace_roots: vec![ROOT.to_string()],
    }
}

pub fn saved(uri: &str) -> EditorEvent {
    EditorEvent::Saved {
        uri: uri.to_string(),
        workspace_roots: vec![ROOT.to_string()],
    }
}

pub fn closed(uri: &str) -> EditorEvent {
    EditorEvent::Closed {
        uri: uri.to_string(),
        workspace_roots: vec![ROOT.to_string()],
    }
}

/// Absolute file URI under [`ROOT`].
pub fn file(name: &str) -> String {
    format!("{ROOT}/{name}")
}
