//! Record of sync attempts.
//!
//! Every flush that reaches a sink is logged here, successful or not, so
//! `journal history` can tell when the journal was last delivered and why a
//! sync failed. The log lives in `sync-history.json` under the data
//! directory, newest entry first, capped at `history.max_entries` and pruned
//! of entries older than `history.auto_clear_days` on load.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::{Config, HistoryConfig};
use crate::error::{Error, Result};
use crate::flush::FlushTrigger;

const HISTORY_FILE: &str = "sync-history.json";
const FORMAT_VERSION: u32 = 1;

/// One sync attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncHistoryEntry {
    /// Report id
    pub id: Uuid,
    /// When the report was generated
    pub timestamp: DateTime<Utc>,
    /// What started the flush
    pub trigger: FlushTrigger,
    /// Sink the report was pushed to
    pub sink: String,
    /// Sessions in the report
    pub sessions: usize,
    /// Projects in the report
    pub projects: usize,
    /// Whether the sink accepted the report
    pub success: bool,
    /// Failure reason
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl SyncHistoryEntry {
    /// A successful attempt stamped with the current time.
    #[must_use]
    pub fn new(
        id: Uuid,
        trigger: FlushTrigger,
        sink: &str,
        sessions: usize,
        projects: usize,
    ) -> Self {
        Self {
            id,
            timestamp: Utc::now(),
            trigger,
            sink: sink.to_string(),
            sessions,
            projects,
            success: true,
            error_message: None,
        }
    }

    /// Override the attempt time.
    #[must_use]
    pub fn at(self, timestamp: DateTime<Utc>) -> Self {
        Self { timestamp, ..self }
    }

    /// Turn the entry into a failed attempt.
    #[must_use]
    pub fn with_error(self, message: String) -> Self {
        Self {
            success: false,
            error_message: Some(message),
            ..self
        }
    }

    /// `YYYY-MM-DD HH:MM` in UTC.
    #[must_use]
    pub fn formatted_timestamp(&self) -> String {
        self.timestamp.format("%Y-%m-%d %H:%M").to_string()
    }
}

/// On-disk layout.
#[derive(Debug, Serialize, Deserialize)]
struct HistoryFile {
    version: u32,
    entries: Vec<SyncHistoryEntry>,
}

/// Persistent list of sync attempts.
#[derive(Debug)]
pub struct SyncHistoryStore {
    path: PathBuf,
    entries: Vec<SyncHistoryEntry>,
    config: HistoryConfig,
}

impl SyncHistoryStore {
    /// Open the store in the data directory.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing history file cannot be read.
    pub fn load_with_config(config: HistoryConfig) -> Result<Self> {
        let path = Self::default_path().unwrap_or_else(|| PathBuf::from(HISTORY_FILE));
        Self::load_from(path, config)
    }

    /// Open the store at `path`. A missing file is an empty history.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from(path: PathBuf, config: HistoryConfig) -> Result<Self> {
        let entries = match fs::read_to_string(&path) {
            Ok(content) => {
                let file: HistoryFile = serde_json::from_str(&content)
                    .map_err(|e| store_error("parse", &path, &e))?;
                file.entries
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(store_error("read", &path, &e)),
        };

        let mut store = Self {
            path,
            entries,
            config,
        };
        store.prune(Utc::now());
        Ok(store)
    }

    /// `sync-history.json` in the data directory.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        Config::data_dir().map(|dir| dir.join(HISTORY_FILE))
    }

    /// Write the store to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file or its directory cannot be written.
    pub fn save(&self) -> Result<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|e| store_error("create directory for", dir, &e))?;
        }

        let file = HistoryFile {
            version: FORMAT_VERSION,
            entries: self.entries.clone(),
        };
        let json = serde_json::to_string_pretty(&file)
            .map_err(|e| store_error("serialize", &self.path, &e))?;

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|e| store_error("write", &tmp, &e))?;
        fs::rename(&tmp, &self.path).map_err(|e| store_error("replace", &self.path, &e))
    }

    /// Record an attempt as the newest entry and persist.
    ///
    /// Does nothing when history is disabled.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be saved.
    pub fn add(&mut self, entry: SyncHistoryEntry) -> Result<()> {
        if !self.config.enabled {
            return Ok(());
        }

        self.entries.insert(0, entry);
        self.entries.truncate(self.config.max_entries);
        self.save()
    }

    /// Newest entries first, at most `limit` of them.
    #[must_use]
    pub fn list(&self, limit: Option<usize>) -> &[SyncHistoryEntry] {
        let n = limit.unwrap_or(usize::MAX).min(self.entries.len());
        &self.entries[..n]
    }

    /// Most recent successful sync.
    #[must_use]
    pub fn last_success(&self) -> Option<&SyncHistoryEntry> {
        self.entries.iter().find(|e| e.success)
    }

    /// Number of recorded attempts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry and persist.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be saved.
    pub fn clear(&mut self) -> Result<()> {
        self.entries.clear();
        self.save()
    }

    /// Location of the history file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn prune(&mut self, now: DateTime<Utc>) {
        let Some(days) = self.config.auto_clear_days else {
            return;
        };

        let cutoff = now - Duration::days(i64::from(days));
        let before = self.entries.len();
        self.entries.retain(|e| e.timestamp >= cutoff);

        let expired = before - self.entries.len();
        if expired > 0 {
            tracing::debug!(expired, days, "Dropped expired sync history");
        }
    }
}

fn store_error(action: &str, path: &Path, e: &dyn std::fmt::Display) -> Error {
    Error::HistoryError(format!(
        "Failed to {action} sync history at {}: {e}",
        path.display()
    ))
}
