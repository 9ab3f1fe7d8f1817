//! Export destinations for finalized sessions.
//!
//! A [`SessionSink`] receives one [`JournalReport`] per flush. Returning an
//! error leaves the sessions queued for the next attempt.
//!
//! | Sink | Destination |
//! |------|-------------|
//! | [`LogSink`] | the log only |
//! | [`HttpSink`] | JSON `POST` to the backend URL |
//! | [`GitHubSink`] | Markdown file committed through the GitHub contents API |
//! | [`FileSink`] | Markdown file in a local directory |

use std::time::Duration;

use async_trait::async_trait;

use crate::config::{Config, SinkKind};
use crate::error::{Error, Result};
use crate::report::JournalReport;

pub mod file;
pub mod github;
pub mod http;

pub use file::FileSink;
pub use github::GitHubSink;
pub use http::HttpSink;

/// User agent sent with remote requests.
const USER_AGENT: &str = concat!("activity-journal/", env!("CARGO_PKG_VERSION"));

/// Destination of a flush.
#[async_trait]
pub trait SessionSink: Send + Sync {
    /// Short name for logs and history.
    fn name(&self) -> &str;

    /// Deliver a report.
    async fn push(&self, report: &JournalReport) -> Result<()>;
}

/// Sink that only writes the report to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

#[async_trait]
impl SessionSink for LogSink {
    fn name(&self) -> &str {
        "log"
    }

    async fn push(&self, report: &JournalReport) -> Result<()> {
        tracing::info!(
            id = %report.id,
            sessions = report.session_count(),
            "Journal report generated"
        );
        tracing::debug!("\n{}", report.render_markdown());
        Ok(())
    }
}

/// Build the sink selected by `sync.sink`.
///
/// # Errors
///
/// Returns an error if the configuration is incomplete for the chosen sink.
pub fn build_sink(config: &Config) -> Result<Box<dyn SessionSink>> {
    config.validate()?;

    let sink: Box<dyn SessionSink> = match config.sync.sink {
        SinkKind::Log => Box::new(LogSink),
        SinkKind::Http => Box::new(HttpSink::new(
            &config.general.backend_url,
            config.sync.request_timeout,
        )?),
        SinkKind::GitHub => Box::new(GitHubSink::from_config(
            &config.github,
            config.sync.request_timeout,
        )?),
        SinkKind::File => Box::new(FileSink::new(config.output_dir())),
    };

    tracing::debug!(sink = sink.name(), "Sink configured");
    Ok(sink)
}

fn http_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
        .map_err(|e| Error::Internal(format!("failed to build HTTP client: {e}")))
}

fn request_error(e: &reqwest::Error, timeout: Duration) -> Error {
    if e.is_timeout() {
        Error::Timeout(timeout.as_secs())
    } else {
        Error::Network(e.to_string())
    }
}

async fn rejected(response: reqwest::Response) -> Error {
    let status = response.status().as_u16();
    let message = response
        .text()
        .await
        .unwrap_or_default()
        .chars()
        .take(512)
        .collect();
    Error::RemoteRejected { status, message }
}
