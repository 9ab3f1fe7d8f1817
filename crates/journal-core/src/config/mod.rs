//! Configuration management for Activity Journal.
//!
//! This module handles loading, saving, and validating journal configuration.
//!
//! ## Configuration File Locations
//!
//! | Platform | Path |
//! |----------|------|
//! | Linux | `~/.config/activity-journal/config.toml` |
//! | macOS | `~/Library/Application Support/Activity-Journal/config.toml` |
//! | Windows | `%APPDATA%\Activity Journal\config\config.toml` |
//!
//! ## Example
//!
//! ```rust,ignore
//! use journal_core::config::Config;
//!
//! let config = Config::load()?;
//! println!("Syncing every {} minutes", config.sync.frequency_minutes);
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Main configuration struct for Activity Journal.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,
    /// Sync settings
    pub sync: SyncConfig,
    /// Remote repository settings
    pub github: GitHubConfig,
    /// Document filter settings
    pub filter: FilterConfig,
    /// Sync history settings
    pub history: HistoryConfig,
}

/// General configuration options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Backend endpoint receiving JSON reports
    pub backend_url: String,
    /// Emit informational logs
    pub enable_logging: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            backend_url: "http://localhost:3000/api/activity".to_string(),
            enable_logging: true,
        }
    }
}

/// Where flushed sessions are sent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    /// Only log the report
    #[default]
    Log,
    /// POST the JSON report to the backend URL
    Http,
    /// Commit the Markdown report to a GitHub repository
    GitHub,
    /// Write the Markdown report to a local directory
    File,
}

impl fmt::Display for SinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Log => write!(f, "log"),
            Self::Http => write!(f, "http"),
            Self::GitHub => write!(f, "github"),
            Self::File => write!(f, "file"),
        }
    }
}

impl FromStr for SinkKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "log" => Ok(Self::Log),
            "http" => Ok(Self::Http),
            "github" => Ok(Self::GitHub),
            "file" => Ok(Self::File),
            other => Err(Error::InvalidConfig {
                key: "sync.sink".to_string(),
                reason: format!("unknown sink '{other}' (expected log, http, github or file)"),
            }),
        }
    }
}

/// Sync configuration options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Minutes between periodic flushes
    pub frequency_minutes: u64,
    /// Destination of flushed sessions
    pub sink: SinkKind,
    /// Timeout for sink requests
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
    /// Directory for the file sink (None = data directory)
    pub output_dir: Option<PathBuf>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            frequency_minutes: crate::DEFAULT_SYNC_FREQUENCY_MINUTES,
            sink: SinkKind::Log,
            request_timeout: Duration::from_secs(crate::DEFAULT_REQUEST_TIMEOUT_SECS),
            output_dir: None,
        }
    }
}

/// Remote repository configuration options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    /// Repository owner
    pub owner: Option<String>,
    /// Repository name
    pub repo: Option<String>,
    /// Target branch (None = repository default)
    pub branch: Option<String>,
    /// Directory inside the repository for journal files
    pub directory: String,
    /// Environment variable holding the access token
    pub token_env: String,
    /// API base URL
    pub api_url: String,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            owner: None,
            repo: None,
            branch: None,
            directory: "journal".to_string(),
            token_env: "JOURNAL_GITHUB_TOKEN".to_string(),
            api_url: "https://api.github.com".to_string(),
        }
    }
}

impl GitHubConfig {
    /// Read the access token from the configured environment variable.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingCredential`] if the variable is unset or empty.
    pub fn token(&self) -> Result<String> {
        token_from_env(&self.token_env)
    }
}

/// Read an access token from the environment variable `var`.
///
/// # Errors
///
/// Returns [`Error::MissingCredential`] if the variable is unset or blank.
pub fn token_from_env(var: &str) -> Result<String> {
    match std::env::var(var) {
        Ok(token) if !token.trim().is_empty() => Ok(token.trim().to_string()),
        _ => Err(Error::MissingCredential(var.to_string())),
    }
}

/// Document filter configuration options.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Extra glob patterns for documents that should not be tracked
    pub exclude: Vec<String>,
}

/// Sync history configuration options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Record sync attempts
    pub enabled: bool,
    /// Maximum history entries
    pub max_entries: usize,
    /// Auto-clear after days
    pub auto_clear_days: Option<u32>,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_entries: 100,
            auto_clear_days: Some(30),
        }
    }
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// If the configuration file doesn't exist, returns the default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from a specific file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::ConfigError(format!("Failed to read config: {e}")))?;

        toml::from_str(&content)
            .map_err(|e| Error::ConfigError(format!("Failed to parse config: {e}")))
    }

    /// Save configuration to the default location.
    ///
    /// Creates the configuration directory if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be written.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    /// Save configuration to a specific file.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be written.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                Error::ConfigError(format!("Failed to create config directory: {e}"))
            })?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::ConfigError(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path, content)
            .map_err(|e| Error::ConfigError(format!("Failed to write config: {e}")))
    }

    /// Check that the configuration can drive a sync.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] naming the first offending key.
    pub fn validate(&self) -> Result<()> {
        if self.sync.frequency_minutes == 0 {
            return Err(invalid("sync.frequency_minutes", "must be at least 1"));
        }
        if self.sync.frequency_minutes > crate::MAX_SYNC_FREQUENCY_MINUTES {
            return Err(invalid(
                "sync.frequency_minutes",
                &format!("must be at most {}", crate::MAX_SYNC_FREQUENCY_MINUTES),
            ));
        }

        if self.sync.request_timeout.is_zero() {
            return Err(invalid("sync.request_timeout", "must be greater than zero"));
        }

        match self.sync.sink {
            SinkKind::Http if self.general.backend_url.trim().is_empty() => {
                return Err(invalid(
                    "general.backend_url",
                    "required when sync.sink = \"http\"",
                ));
            }
            SinkKind::GitHub => {
                if is_blank(self.github.owner.as_deref()) {
                    return Err(invalid("github.owner", "required when sync.sink = \"github\""));
                }
                if is_blank(self.github.repo.as_deref()) {
                    return Err(invalid("github.repo", "required when sync.sink = \"github\""));
                }
                if self.github.token_env.trim().is_empty() {
                    return Err(invalid("github.token_env", "must name an environment variable"));
                }
            }
            _ => {}
        }

        Ok(())
    }

    /// Interval between periodic flushes, clamped to the accepted range.
    #[must_use]
    pub fn sync_interval(&self) -> Duration {
        let minutes = self
            .sync
            .frequency_minutes
            .clamp(1, crate::MAX_SYNC_FREQUENCY_MINUTES);
        Duration::from_secs(minutes * 60)
    }

    /// Directory used by the file sink.
    #[must_use]
    pub fn output_dir(&self) -> PathBuf {
        self.sync.output_dir.clone().unwrap_or_else(|| {
            Self::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("journals")
        })
    }

    /// Get the default configuration directory path.
    #[must_use]
    pub fn config_dir() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn data_dir() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.data_dir().to_path_buf())
    }

    /// Get the full path to the configuration file.
    #[must_use]
    pub fn config_path() -> PathBuf {
        Self::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("config.toml")
    }
}

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("dev", "activity-journal", "Activity-Journal")
}

fn invalid(key: &str, reason: &str) -> Error {
    Error::InvalidConfig {
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(|v| v.trim().is_empty())
}

/// Parse a duration written as `30s`, `2m` or a bare number of seconds.
///
/// # Errors
///
/// Returns [`Error::InvalidConfig`] for anything else, including zero.
pub fn parse_duration(value: &str) -> Result<Duration> {
    let value = value.trim();
    let (number, unit_secs) = value
        .strip_suffix('s')
        .map(|n| (n, 1))
        .or_else(|| value.strip_suffix('m').map(|n| (n, 60)))
        .unwrap_or((value, 1));

    match number.trim().parse::<u64>() {
        Ok(n) if n > 0 => Ok(Duration::from_secs(n * unit_secs)),
        _ => Err(invalid(
            "sync.request_timeout",
            &format!("invalid duration '{value}' (expected e.g. 10s or 1m)"),
        )),
    }
}

mod humantime_serde {
    use serde::{de, Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, ser: S) -> Result<S::Ok, S::Error> {
        ser.collect_str(&format_args!("{}s", duration.as_secs()))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<Duration, D::Error> {
        let raw = String::deserialize(de)?;
        super::parse_duration(&raw).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_default() {
        let config = Config::default();

        assert_eq!(config.sync.frequency_minutes, 5);
        assert_eq!(config.sync.sink, SinkKind::Log);
        assert!(config.general.enable_logging);
        assert_eq!(config.sync_interval(), Duration::from_secs(300));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config").join("config.toml");

        let mut original = Config::default();
        original.general.backend_url = "https://journal.example.com/ingest".to_string();
        original.sync.frequency_minutes = 15;
        original.sync.sink = SinkKind::GitHub;
        original.github.owner = Some("octo".to_string());
        original.github.repo = Some("notes".to_string());
        original.filter.exclude = vec!["**/target/**".to_string()];

        original.save_to(&config_path).expect("save");
        let loaded = Config::load_from(&config_path).expect("load");

        assert_eq!(loaded.general.backend_url, "https://journal.example.com/ingest");
        assert_eq!(loaded.sync.frequency_minutes, 15);
        assert_eq!(loaded.sync.sink, SinkKind::GitHub);
        assert_eq!(loaded.github.owner.as_deref(), Some("octo"));
        assert_eq!(loaded.filter.exclude, vec!["**/target/**".to_string()]);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config::load_from(&temp_dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.sync.frequency_minutes, 5);
    }

    #[test]
    fn test_config_deserialization_partial() {
        let partial_toml = r#"
[general]
enable_logging = false

[sync]
frequency_minutes = 1
sink = "file"
request_timeout = "2m"
"#;

        let config: Config = toml::from_str(partial_toml).expect("parse partial config");

        assert!(!config.general.enable_logging);
        assert_eq!(config.sync.frequency_minutes, 1);
        assert_eq!(config.sync.sink, SinkKind::File);
        assert_eq!(config.sync.request_timeout, Duration::from_secs(120));
        assert_eq!(config.github.token_env, "JOURNAL_GITHUB_TOKEN");
        assert_eq!(config.history.max_entries, 100);
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[sync]\nfrequency_minutes = \"often\"\n").unwrap();

        assert!(matches!(
            Config::load_from(&path),
            Err(Error::ConfigError(_))
        ));
    }

    #[test]
    fn test_validate_rejects_zero_frequency() {
        let mut config = Config::default();
        config.sync.frequency_minutes = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("sync.frequency_minutes"));
    }

    #[test]
    fn test_huge_frequency_is_rejected_and_clamped() {
        let mut config = Config::default();
        config.sync.frequency_minutes = u64::MAX;

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("at most"));
        assert_eq!(config.sync_interval(), Duration::from_secs(7 * 24 * 3600));

        config.sync.frequency_minutes = crate::MAX_SYNC_FREQUENCY_MINUTES;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_github_requires_repository() {
        let mut config = Config::default();
        config.sync.sink = SinkKind::GitHub;
        config.github.owner = Some("octo".to_string());
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("github.repo"));

        config.github.repo = Some("notes".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_http_requires_backend() {
        let mut config = Config::default();
        config.sync.sink = SinkKind::Http;
        config.general.backend_url = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_sink_kind_parse_and_display() {
        assert_eq!("GitHub".parse::<SinkKind>().unwrap(), SinkKind::GitHub);
        assert_eq!("http".parse::<SinkKind>().unwrap(), SinkKind::Http);
        assert!("ftp".parse::<SinkKind>().is_err());
        assert_eq!(SinkKind::File.to_string(), "file");
    }

    #[test]
    fn test_sink_kind_serialization() {
        let mut config = Config::default();
        config.sync.sink = SinkKind::GitHub;
        let toml_str = toml::to_string_pretty(&config).expect("serialize");

        assert!(toml_str.contains("sink = \"github\""));
        assert!(toml_str.contains("request_timeout = \"10s\""));
    }

    #[test]
    fn test_missing_token_is_missing_credential() {
        let github = GitHubConfig {
            token_env: "JOURNAL_TEST_TOKEN_THAT_IS_NEVER_SET".to_string(),
            ..Default::default()
        };
        assert!(matches!(github.token(), Err(Error::MissingCredential(_))));
    }

    #[test]
    fn test_config_path() {
        assert!(Config::config_path().ends_with("config.toml"));
    }

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("15s").unwrap(), Duration::from_secs(15));
        assert_eq!(parse_duration(" 2m ").unwrap(), Duration::from_secs(120));
        assert_eq!(parse_duration("45").unwrap(), Duration::from_secs(45));
        assert!(parse_duration("0s").is_err());
        assert!(parse_duration("soon").is_err());
    }
}
