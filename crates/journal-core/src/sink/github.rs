//! GitHub repository sink.
//!
//! Each report is committed as a Markdown file through the contents API:
//!
//! ```text
//! PUT {api}/repos/{owner}/{repo}/contents/{directory}/{file}
//! ```
//!
//! Report file names are unique, so every write creates a new file. The
//! request carries no blob sha: if the path already exists GitHub answers
//! 422 and the flush fails instead of replacing an earlier report.

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine as _;
use serde::Serialize;

use super::{http_client, rejected, request_error, SessionSink};
use crate::config::{token_from_env, GitHubConfig};
use crate::error::{Error, Result};
use crate::report::JournalReport;

const GITHUB_API_VERSION: &str = "2022-11-28";

/// Commits reports to a GitHub repository.
#[derive(Debug, Clone)]
pub struct GitHubSink {
    client: reqwest::Client,
    api_url: String,
    owner: String,
    repo: String,
    branch: Option<String>,
    directory: String,
    token_env: String,
    timeout: Duration,
}

/// Body of a contents API write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentsRequest {
    /// Commit message
    pub message: String,
    /// Base64-encoded file content
    pub content: String,
    /// Target branch
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
}

impl GitHubSink {
    /// Create a sink from the `[github]` configuration section.
    ///
    /// The access token is read on every push, so a missing token surfaces
    /// as a failed flush rather than a startup error.
    ///
    /// # Errors
    ///
    /// Returns an error if owner or repo is missing.
    pub fn from_config(config: &GitHubConfig, timeout: Duration) -> Result<Self> {
        let owner = required(config.owner.as_deref(), "github.owner")?;
        let repo = required(config.repo.as_deref(), "github.repo")?;

        Ok(Self {
            client: http_client(timeout)?,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            owner,
            repo,
            branch: config.branch.clone().filter(|b| !b.trim().is_empty()),
            directory: config.directory.trim_matches('/').to_string(),
            token_env: config.token_env.clone(),
            timeout,
        })
    }

    /// Repository path of the file a report is written to.
    #[must_use]
    pub fn file_path(&self, report: &JournalReport) -> String {
        if self.directory.is_empty() {
            report.file_name()
        } else {
            format!("{}/{}", self.directory, report.file_name())
        }
    }

    /// Contents API URL for a repository path.
    #[must_use]
    pub fn contents_url(&self, path: &str) -> String {
        format!(
            "{}/repos/{}/{}/contents/{}",
            self.api_url, self.owner, self.repo, path
        )
    }

    /// Build the write request for a report.
    #[must_use]
    pub fn contents_request(&self, report: &JournalReport) -> ContentsRequest {
        let content =
            base64::engine::general_purpose::STANDARD.encode(report.render_markdown().as_bytes());

        ContentsRequest {
            message: format!(
                "journal: {} session(s) at {}",
                report.session_count(),
                report.generated_at.format("%Y-%m-%d %H:%M UTC")
            ),
            content,
            branch: self.branch.clone(),
        }
    }
}

#[async_trait]
impl SessionSink for GitHubSink {
    fn name(&self) -> &str {
        "github"
    }

    async fn push(&self, report: &JournalReport) -> Result<()> {
        let token = token_from_env(&self.token_env)?;
        let path = self.file_path(report);
        let url = self.contents_url(&path);

        let body = self.contents_request(report);

        let response = self
            .client
            .put(&url)
            .bearer_auth(&token)
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", GITHUB_API_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| request_error(&e, self.timeout))?;

        if !response.status().is_success() {
            return Err(rejected(response).await);
        }

        tracing::debug!(
            repo = %format!("{}/{}", self.owner, self.repo),
            path = %path,
            "Journal committed"
        );
        Ok(())
    }
}

fn required(value: Option<&str>, key: &str) -> Result<String> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(Error::InvalidConfig {
            key: key.to_string(),
            reason: "required for the github sink".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::ProjectId;
    use crate::session::{FileSession, FinalizedBatch};
    use chrono::{TimeZone, Utc};

    fn config() -> GitHubConfig {
        GitHubConfig {
            owner: Some("octo".to_string()),
            repo: Some("notes".to_string()),
            branch: Some("journal".to_string()),
            directory: "/logs/".to_string(),
            token_env: "JOURNAL_TEST_UNSET_TOKEN".to_string(),
            api_url: "https://api.github.com/".to_string(),
        }
    }

    fn report() -> JournalReport {
        let at = Utc.with_ymd_and_hms(2024, 8, 1, 17, 30, 0).unwrap();
        let mut session = FileSession::new("file:///notes/todo.md", at);
        session.close(at);
        let mut batch = FinalizedBatch::new();
        batch.insert(ProjectId::new("file:///notes"), vec![session]);
        let mut report = JournalReport::from_batch(&batch, at);
        report.id = uuid::Uuid::from_u128(0x0123_4567_89ab_cdef_0000_0000_0000_0000);
        report
    }

    #[test]
    fn test_paths_and_urls() {
        let sink = GitHubSink::from_config(&config(), Duration::from_secs(5)).unwrap();
        let path = sink.file_path(&report());

        assert_eq!(path, "logs/journal-2024-08-01T17-30-00Z-01234567.md");
        assert_eq!(
            sink.contents_url(&path),
            "https://api.github.com/repos/octo/notes/contents/logs/journal-2024-08-01T17-30-00Z-01234567.md"
        );
    }

    #[test]
    fn test_contents_request() {
        let sink = GitHubSink::from_config(&config(), Duration::from_secs(5)).unwrap();
        let request = sink.contents_request(&report());

        let decoded = base64::engine::general_purpose::STANDARD
            .decode(&request.content)
            .unwrap();
        let markdown = String::from_utf8(decoded).unwrap();

        assert!(markdown.contains("### todo.md"));
        assert_eq!(request.branch.as_deref(), Some("journal"));
        assert_eq!(request.message, "journal: 1 session(s) at 2024-08-01 17:30 UTC");
    }

    #[test]
    fn test_request_omits_absent_fields() {
        let mut cfg = config();
        cfg.branch = None;
        let sink = GitHubSink::from_config(&cfg, Duration::from_secs(5)).unwrap();
        let json = serde_json::to_value(sink.contents_request(&report())).unwrap();

        assert!(json.get("branch").is_none());
    }

    #[test]
    fn test_missing_owner() {
        let mut cfg = config();
        cfg.owner = None;
        assert!(GitHubSink::from_config(&cfg, Duration::from_secs(5)).is_err());
    }

    #[tokio::test]
    async fn test_push_without_token_fails_before_network() {
        let sink = GitHubSink::from_config(&config(), Duration::from_secs(5)).unwrap();
        let err = sink.push(&report()).await.unwrap_err();
        assert!(matches!(err, Error::MissingCredential(ref var) if var == "JOURNAL_TEST_UNSET_TOKEN"));
    }
}
