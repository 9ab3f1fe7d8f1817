//! # Activity Journal Core Library
//!
//! `journal-core` turns a stream of editor events (file opened, saved,
//! closed) into per-file sessions grouped by project, and periodically
//! exports the finished sessions to an external sink.
//!
//! ## Modules
//!
//! - [`clock`] - Injectable time source
//! - [`config`] - Configuration management
//! - [`event`] - Editor events received from the host
//! - [`filter`] - Skip predicate for version-control metadata and excludes
//! - [`flush`] - Export of finalized sessions to a sink
//! - [`history`] - Sync attempt history tracking and persistence
//! - [`notify`] - User-visible notifications
//! - [`project`] - Project identification from workspace roots
//! - [`report`] - Journal document rendering
//! - [`service`] - Event loop tying tracker, timer and sink together
//! - [`session`] - File sessions and the session tracker
//! - [`sink`] - Remote and local export destinations
//!
//! ## Example
//!
//! ```rust,ignore
//! use journal_core::config::Config;
//! use journal_core::service::JournalService;
//!
//! let config = Config::load()?;
//! let service = JournalService::from_config(&config)?;
//! let (tx, rx) = tokio::sync::mpsc::channel(256);
//! let stats = service.run(rx).await;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::must_use_candidate)]

pub mod clock;
pub mod config;
pub mod error;
pub mod event;
pub mod filter;
pub mod flush;
pub mod history;
pub mod notify;
pub mod project;
pub mod report;
pub mod service;
pub mod session;
pub mod sink;

pub use error::{Error, Result};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default sync frequency in minutes
pub const DEFAULT_SYNC_FREQUENCY_MINUTES: u64 = 5;

/// Longest accepted sync interval in minutes (one week).
pub const MAX_SYNC_FREQUENCY_MINUTES: u64 = 7 * 24 * 60;

/// Project identifier used when no workspace root is open
pub const NO_ROOT_PROJECT_ID: &str = "no-root";

/// Capacity of the editor event channel feeding the service
pub const DEFAULT_EVENT_CHANNEL_CAPACITY: usize = 256;

/// Default timeout for sink requests in seconds
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
