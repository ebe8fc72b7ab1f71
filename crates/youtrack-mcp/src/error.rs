//! Error types for the YouTrack MCP server.

use rmcp::ErrorData as McpError;
use thiserror::Error;

/// Errors that can occur in the YouTrack MCP server.
#[derive(Debug, Error)]
pub enum Error {
    /// `create_issue` named no project and none is configured.
    #[error("No project given and no default project configured. Pass 'project' or start the server with --project")]
    NoProject,

    /// Invalid argument value provided.
    #[error("Invalid {field}: '{value}'. {reason}")]
    InvalidArgument {
        /// The parameter that had an invalid value.
        field: &'static str,
        /// The invalid value that was provided.
        value: String,
        /// What a valid value looks like.
        reason: String,
    },

    /// An error from the YouTrack client, carrying the upstream message.
    #[error(transparent)]
    Tracker(#[from] youtrack::error::Error),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// MCP protocol error.
    #[error("MCP error: {0}")]
    Mcp(String),
}

impl Error {
    /// Whether the caller can fix this by changing the tool arguments.
    #[must_use]
    pub fn is_invalid_params(&self) -> bool {
        matches!(
            self,
            Self::NoProject
                | Self::InvalidArgument { .. }
                | Self::Tracker(youtrack::error::Error::InvalidInput { .. })
        )
    }
}

impl From<Error> for McpError {
    fn from(error: Error) -> Self {
        if error.is_invalid_params() {
            Self::invalid_params(error.to_string(), None)
        } else {
            Self::internal_error(error.to_string(), None)
        }
    }
}

/// Result type for YouTrack MCP operations.
pub type Result<T> = std::result::Result<T, Error>;
