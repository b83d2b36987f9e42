//! Service Module
//!
//! Business logic behind each endpoint: input validation, provider
//! request bodies, and normalizing provider responses.

pub mod model;
pub mod removebg;
pub mod tryon;

// Re-export for convenience
pub use model as model_service;
pub use removebg as removebg_service;
pub use tryon as tryon_service;

use atelier_client::{ClientError, JobError};
use serde_json::Value;

/// Service error type
#[derive(Debug)]
pub enum ServiceError {
    /// Required input missing or malformed; no provider was called
    ValidationError(String),
    /// Credential of the selected try-on backend is absent
    MissingCredential(String),
    /// Server-side provider configuration is absent
    NotConfigured(String),
    /// Asynchronous job did not produce an image
    Job(JobError),
    /// Single-call provider request failed
    Provider(ClientError),
    /// Provider answered with an error status that is passed through
    Upstream {
        status: u16,
        message: String,
        detail: Value,
    },
    /// Provider answered successfully but without an image reference
    NoImage { message: String, raw: Option<Value> },
}

impl From<JobError> for ServiceError {
    fn from(err: JobError) -> Self {
        ServiceError::Job(err)
    }
}

impl From<ClientError> for ServiceError {
    fn from(err: ClientError) -> Self {
        ServiceError::Provider(err)
    }
}

/// Rejects absent or blank required text fields
pub(crate) fn required(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
