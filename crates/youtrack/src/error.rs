//! Error types for YouTrack client and CLI operations.

use std::io;
use thiserror::Error;

/// The error type for YouTrack operations.
#[derive(Debug, Error)]
pub enum Error {
    /// IO error occurred.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Configuration error (missing or malformed settings).
    #[error("Configuration error: {0}")]
    Config(String),

    /// Input rejected before any request was sent.
    #[error("Invalid {field}: {reason}")]
    InvalidInput {
        /// The field that failed validation.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// The requested resource does not exist upstream.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The token was rejected or lacks permission.
    #[error("Unauthorized ({status}): {message}")]
    Unauthorized {
        /// HTTP status code returned by the server.
        status: u16,
        /// Upstream error message.
        message: String,
    },

    /// Any other non-success response from the server.
    #[error("YouTrack API error ({status}): {message}")]
    Api {
        /// HTTP status code returned by the server.
        status: u16,
        /// Upstream error message.
        message: String,
    },

    /// The issue was saved but the follow-up field command failed.
    ///
    /// Retrying the whole operation would write the issue twice, so the
    /// error names the issue that now exists.
    #[error("Issue {issue} was {action}, but setting fields with '{command}' failed: {source}")]
    PartialWrite {
        /// Readable id of the issue that was written.
        issue: String,
        /// What happened to the issue (`created` or `updated`).
        action: &'static str,
        /// The command that failed.
        command: String,
        /// Why the command failed.
        source: Box<Error>,
    },

    /// Transport-level failure (connection refused, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body could not be decoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Shorthand for [`Error::InvalidInput`].
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field,
            reason: reason.into(),
        }
    }
}

/// A specialized Result type for YouTrack operations.
pub type Result<T> = std::result::Result<T, Error>;
