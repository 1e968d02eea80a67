//! Error types for the cluster API tooling

use thiserror::Error;

/// Result alias used throughout the library
pub type Result<T> = std::result::Result<T, CapiError>;

/// Failures that abort a run.
///
/// Missing fields in the state document are never errors; they resolve to
/// defaults during extraction. Snapshot and sink failures are reported
/// through their own outcome types and never surface here.
#[derive(Error, Debug)]
pub enum CapiError {
    /// Transport-level failure talking to the cluster API
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Cluster API answered with a non-2xx status
    #[error("cluster API error ({status}): {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    /// Response or state file is not a valid state document
    #[error("failed to load data: {0}")]
    Parse(#[from] serde_json::Error),

    /// I/O error reading a state file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Base URL could not be parsed or joined
    #[error("invalid cluster API URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl CapiError {
    /// True for failures caused by the document contents rather than transport
    pub fn is_parse(&self) -> bool {
        matches!(self, CapiError::Parse(_))
    }
}
