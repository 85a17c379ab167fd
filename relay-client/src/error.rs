//! Error types for the upstream client

use std::time::Duration;

use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur when talking to the upstream workflow
#[derive(Debug, Error)]
pub enum ClientError {
    /// A required upstream endpoint is not configured
    #[error("{0} not configured")]
    NotConfigured(&'static str),

    /// A job id that cannot be used as a single URL path segment
    #[error("Invalid job id: {0:?}")]
    InvalidJobId(String),

    /// The upstream did not answer within the allowed time
    #[error("Upstream request timed out after {0:?}")]
    Timeout(Duration),

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Upstream returned an error status code
    #[error("Upstream error (status {status}): {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Response body text
        message: String,
    },

    /// Failed to parse response
    #[error("Failed to parse response: {0}")]
    ParseError(String),
}

impl ClientError {
    /// Create an API error from status code and message
    pub fn api_error(status: u16, message: impl Into<String>) -> Self {
        Self::ApiError {
            status,
            message: message.into(),
        }
    }

    /// Check if this error is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ApiError { status: 404, .. })
    }

    /// Check if the request was abandoned because it took too long
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Timeout(_) => true,
            Self::RequestFailed(err) => err.is_timeout(),
            _ => false,
        }
    }

    /// Check if the job id was refused before any request was made
    pub fn is_invalid_job_id(&self) -> bool {
        matches!(self, Self::InvalidJobId(_))
    }

    /// Check if this error is a missing-configuration error
    pub fn is_not_configured(&self) -> bool {
        matches!(self, Self::NotConfigured(_))
    }
}
