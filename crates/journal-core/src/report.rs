//! Journal document rendering.
//!
//! A flush turns the finalized sessions into a [`JournalReport`]: a JSON
//! payload for HTTP backends and a Markdown document for repositories and
//! local files.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::project::ProjectId;
use crate::session::{FileSession, FinalizedBatch};

/// Summary of one flush, ready for a sink.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalReport {
    /// Unique identifier of this export
    pub id: Uuid,
    /// When the report was generated
    pub generated_at: DateTime<Utc>,
    /// Sessions grouped by project
    pub projects: Vec<ProjectReport>,
}

/// Sessions of one project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectReport {
    /// Project identifier
    pub project: ProjectId,
    /// Finalized sessions in close order
    pub sessions: Vec<FileSession>,
}

impl JournalReport {
    /// Build a report from a finalized batch.
    #[must_use]
    pub fn from_batch(batch: &FinalizedBatch, generated_at: DateTime<Utc>) -> Self {
        let projects = batch
            .projects()
            .map(|(project, sessions)| ProjectReport {
                project: project.clone(),
                sessions: sessions.to_vec(),
            })
            .collect();

        Self {
            id: Uuid::new_v4(),
            generated_at,
            projects,
        }
    }

    /// Total number of sessions in the report.
    #[must_use]
    pub fn session_count(&self) -> usize {
        self.projects.iter().map(|p| p.sessions.len()).sum()
    }

    /// File name used when the report is stored as a document.
    ///
    /// The name carries the generation time and the start of the report id,
    /// so two reports generated in the same instant never share a file.
    #[must_use]
    pub fn file_name(&self) -> String {
        let id = self.id.simple().to_string();
        format!(
            "journal-{}-{}.md",
            self.generated_at.format("%Y-%m-%dT%H-%M-%SZ"),
            &id[..8]
        )
    }

    /// Render the human-readable Markdown document.
    #[must_use]
    pub fn render_markdown(&self) -> String {
        let mut out = format!(
            "# Activity Journal\n\nGenerated: {}\nSessions: {} across {} project(s)\n",
            format_timestamp(self.generated_at),
            self.session_count(),
            self.projects.len()
        );

        for project in &self.projects {
            out.push_str(&format!("\n## Project: {}\n", project.project));
            for session in &project.sessions {
                out.push_str(&render_session(session));
            }
        }

        out
    }
}

fn render_session(session: &FileSession) -> String {
    let closed = session
        .closed_at
        .map_or_else(|| "still open".to_string(), format_timestamp);

    let mut out = format!(
        "\n### {}\n\n- File: `{}`\n- Opened: {}\n- Closed: {}\n",
        session.display_name(),
        session.file_uri,
        format_timestamp(session.opened_at),
        closed
    );
    if let Some(duration) = session.duration() {
        out.push_str(&format!("- Duration: {}\n", format_duration(duration)));
    }
    out.push_str(&format!("- Saves: {}\n", session.saves_count));
    out
}

fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

/// Format a duration as `1h 02m 03s`, `4m 05s` or `6s`.
#[must_use]
pub fn format_duration(duration: Duration) -> String {
    let total = duration.num_seconds().max(0);
    let (hours, minutes, seconds) = (total / 3600, (total % 3600) / 60, total % 60);

    if hours > 0 {
        format!("{hours}h {minutes:02}m {seconds:02}s")
    } else if minutes > 0 {
        format!("{minutes}m {seconds:02}s")
    } else {
        format!("{seconds}s")
    }
}
