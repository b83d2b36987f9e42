//! Error types for the provider clients

use atelier_core::domain::job::JobHandle;
use serde_json::Value;
use thiserror::Error;

/// Result type alias for single-call provider operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur on a single provider call
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Provider returned an error status code
    #[error("API error (status {status}): {body}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Raw response body
        body: Value,
    },

    /// Failed to parse response
    #[error("Failed to parse response: {0}")]
    ParseError(String),
}

impl ClientError {
    /// Create an API error from status code and body
    pub fn api_error(status: u16, body: Value) -> Self {
        Self::ApiError { status, body }
    }

    /// Best-effort human-readable message from an error body
    ///
    /// Looks at `error` then `message`, the two keys providers use.
    pub fn upstream_message(&self) -> Option<&str> {
        match self {
            Self::ApiError { body, .. } => ["error", "message"]
                .iter()
                .find_map(|key| body.get(key).and_then(Value::as_str)),
            _ => None,
        }
    }
}

/// Errors from the submit-and-poll cycle of an asynchronous job
#[derive(Debug, Error)]
pub enum JobError {
    /// Job creation rejected, or accepted without a job handle
    #[error("job creation failed (status {status})")]
    CreateFailed { status: u16, body: Value },

    /// Provider reported a terminal failure
    #[error("job {handle} failed")]
    JobFailed { handle: JobHandle, payload: Value },

    /// Poll budget exhausted before a terminal status
    #[error("job {handle} did not finish after {attempts} status checks")]
    Timeout { handle: JobHandle, attempts: u32 },

    /// Terminal success, but no candidate path held an image reference
    #[error("job {handle} succeeded without an image reference")]
    MissingOutput { handle: JobHandle, payload: Value },

    /// Connection-level failure on create or poll
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Status response could not be decoded
    #[error("invalid status response: {0}")]
    InvalidResponse(String),
}
