//! User-visible notifications.
//!
//! Flush results are reported to the user through a [`Notifier`]. Editor
//! hosts typically show these as toasts; the CLI prints them through
//! `tracing`.

use std::sync::{Arc, Mutex, PoisonError};

/// Severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    /// Informational message
    Info,
    /// Something went wrong
    Error,
}

/// A message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Severity
    pub level: NotificationLevel,
    /// Message text
    pub message: String,
}

/// Receives user-visible messages.
pub trait Notifier: Send + Sync {
    /// Show an informational message.
    fn info(&self, message: &str);

    /// Show an error message.
    fn error(&self, message: &str);
}

/// Routes notifications to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn info(&self, message: &str) {
        tracing::info!("{message}");
    }

    fn error(&self, message: &str) {
        tracing::error!("{message}");
    }
}

/// Collects notifications in memory.
///
/// Clones share the same buffer, so one handle can be given to the service
/// and another kept for inspection.
#[derive(Debug, Clone, Default)]
pub struct MemoryNotifier {
    messages: Arc<Mutex<Vec<Notification>>>,
}

impl MemoryNotifier {
    /// Create an empty notifier.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All notifications received so far.
    #[must_use]
    pub fn messages(&self) -> Vec<Notification> {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Error notifications received so far.
    #[must_use]
    pub fn errors(&self) -> Vec<String> {
        self.messages()
            .into_iter()
            .filter(|n| n.level == NotificationLevel::Error)
            .map(|n| n.message)
            .collect()
    }

    fn push(&self, level: NotificationLevel, message: &str) {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Notification {
                level,
                message: message.to_string(),
            });
    }
}

impl Notifier for MemoryNotifier {
    fn info(&self, message: &str) {
        self.push(NotificationLevel::Info, message);
    }

    fn error(&self, message: &str) {
        self.push(NotificationLevel::Error, message);
    }
}
