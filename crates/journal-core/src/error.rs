//! Error types for Activity Journal.
//!
//! This module provides a unified error type for all journal operations,
//! with specific error variants for different failure modes.

use std::io;

use thiserror::Error;

/// A specialized `Result` type for journal operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for Activity Journal.
#[derive(Error, Debug)]
pub enum Error {
    /// Access token for the remote store is not available (E001)
    #[error("missing credential: environment variable '{0}' is not set")]
    MissingCredential(String),

    /// Network request to the sink failed (E002)
    #[error("network error: {0}")]
    Network(String),

    /// Remote store refused the write (E003)
    #[error("remote rejected write with status {status}: {message}")]
    RemoteRejected {
        /// HTTP status code
        status: u16,
        /// Response body or reason
        message: String,
    },

    /// Sink request timed out (E004)
    #[error("operation timed out after {0} seconds")]
    Timeout(u64),

    /// Editor event could not be decoded
    #[error("invalid editor event: {0}")]
    InvalidEvent(String),

    /// Configuration file error
    #[error("configuration error: {0}")]
    ConfigError(String),

    /// Invalid configuration value
    #[error("invalid configuration value for '{key}': {reason}")]
    InvalidConfig {
        /// Configuration key
        key: String,
        /// Reason for invalidity
        reason: String,
    },

    /// Invalid exclusion pattern
    #[error("invalid pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// The offending glob
        pattern: String,
        /// Reason for invalidity
        reason: String,
    },

    /// History database error
    #[error("history error: {0}")]
    HistoryError(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Internal error (should not happen)
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Returns the error code associated with this error, if any.
    ///
    /// Error codes follow the pattern EXXX where XXX is a 3-digit number.
    #[must_use]
    pub const fn code(&self) -> Option<&'static str> {
        match self {
            Self::MissingCredential(_) => Some("E001"),
            Self::Network(_) => Some("E002"),
            Self::RemoteRejected { .. } => Some("E003"),
            Self::Timeout(_) => Some("E004"),
            _ => None,
        }
    }

    /// Returns whether the next sync tick may succeed without user action.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        match self {
            Self::Network(_) | Self::Timeout(_) => true,
            Self::RemoteRejected { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }

    /// Returns a helpful suggestion for resolving the error, if applicable.
    #[must_use]
    pub fn suggestion(&self) -> Option<String> {
        let hint = match self {
            Self::MissingCredential(var) => {
                return Some(format!(
                    "Export a personal access token with 'contents: write' permission:\n  \
                     export {var}=<token>\n\
                     Or change the variable name with: journal config set github.token_env <NAME>"
                ));
            }
            Self::Network(_) | Self::Timeout(_) => {
                "Check your internet connection and the configured backend URL.\n\
                 Pending sessions are kept and retried on the next sync."
            }
            Self::RemoteRejected { status: 401 | 403, .. } => {
                "The access token was refused. Make sure it has not expired and\n\
                 can write to the configured repository."
            }
            Self::InvalidConfig { .. } | Self::ConfigError(_) => {
                "Inspect the configuration with: journal config show"
            }
            _ => return None,
        };
        Some(hint.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}
