//! Error types for run deduplication.

use thiserror::Error;

use crate::models::RunStatus;

/// Errors returned by the GitHub Actions API collaborators.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed before a response was received.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned a non-success response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Requested run does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Response body could not be decoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A header value could not be built (usually a malformed token).
    #[error("Invalid header: {0}")]
    InvalidHeader(String),
}

impl ApiError {
    /// HTTP status code associated with this error, when one was received.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::NotFound(_) => Some(404),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            Self::Serialization(_) | Self::InvalidHeader(_) => None,
        }
    }
}

/// Errors in the process inputs (environment or CLI flags).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A required input was missing or empty.
    #[error("Missing required input: {0}")]
    Missing(&'static str),

    /// Repository slug is not `owner/repo`.
    #[error("Invalid repository '{0}', expected owner/repo")]
    InvalidRepository(String),

    /// Run id is not a positive integer.
    #[error("Invalid run id '{0}'")]
    InvalidRunId(String),

    /// Ref is neither a branch nor a tag.
    #[error("Unsupported ref '{0}', expected refs/heads/* or refs/tags/*")]
    UnsupportedRef(String),
}

/// Fatal errors that abort the whole operation before anything is cancelled.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid process inputs.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The owning workflow of the current run could not be determined.
    #[error("Failed to resolve workflow for run {run_id}: {reason}")]
    Resolution { run_id: u64, reason: String },

    /// A run listing could not be read completely.
    #[error("Failed to list {status} runs: {source}")]
    Listing {
        status: RunStatus,
        #[source]
        source: ApiError,
    },
}
