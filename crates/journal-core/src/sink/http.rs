//! JSON backend sink.

use std::time::Duration;

use async_trait::async_trait;

use super::{http_client, rejected, request_error, SessionSink};
use crate::error::{Error, Result};
use crate::report::JournalReport;

/// Posts each report as JSON to a backend endpoint.
#[derive(Debug, Clone)]
pub struct HttpSink {
    client: reqwest::Client,
    url: String,
    timeout: Duration,
}

impl HttpSink {
    /// Create a sink posting to `url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is empty or the HTTP client cannot be built.
    pub fn new(url: &str, timeout: Duration) -> Result<Self> {
        let url = url.trim();
        if url.is_empty() {
            return Err(Error::InvalidConfig {
                key: "general.backend_url".to_string(),
                reason: "must not be empty".to_string(),
            });
        }

        Ok(Self {
            client: http_client(timeout)?,
            url: url.to_string(),
            timeout,
        })
    }

    /// Endpoint receiving the reports.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl SessionSink for HttpSink {
    fn name(&self) -> &str {
        "http"
    }

    async fn push(&self, report: &JournalReport) -> Result<()> {
        let response = self
            .client
            .post(&self.url)
            .header("Accept", "application/json")
            .json(report)
            .send()
            .await
            .map_err(|e| request_error(&e, self.timeout))?;

        if !response.status().is_success() {
            return Err(rejected(response).await);
        }

        tracing::debug!(url = %self.url, id = %report.id, "Report posted");
        Ok(())
    }
}
