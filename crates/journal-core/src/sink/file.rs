//! Local directory sink.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::SessionSink;
use crate::error::{Error, Result};
use crate::report::JournalReport;

/// Writes each report as a Markdown file into a directory.
#[derive(Debug, Clone)]
pub struct FileSink {
    dir: PathBuf,
}

impl FileSink {
    /// Create a sink writing into `dir`. The directory is created on first push.
    #[must_use]
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Target directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl SessionSink for FileSink {
    fn name(&self) -> &str {
        "file"
    }

    async fn push(&self, report: &JournalReport) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir).await.map_err(|e| {
            Error::Io(std::io::Error::new(
                e.kind(),
                format!("failed to create {}: {e}", self.dir.display()),
            ))
        })?;

        let path = self.dir.join(report.file_name());
        if tokio::fs::try_exists(&path).await? {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::AlreadyExists,
                format!("refusing to replace {}", path.display()),
            )));
        }

        let tmp = path.with_extension("md.tmp");
        tokio::fs::write(&tmp, report.render_markdown()).await?;
        tokio::fs::rename(&tmp, &path).await?;

        tracing::debug!(path = %path.display(), "Journal written");
        Ok(())
    }
}
