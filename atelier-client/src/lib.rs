//! Atelier provider clients
//!
//! HTTP clients for the third-party image providers behind the Atelier
//! service, plus the generic job poller used for providers that run
//! predictions asynchronously.
//!
//! # Example
//!
//! ```no_run
//! use atelier_client::{JobPoller, PollConfig, eachlabs};
//!
//! # async fn example() -> Result<(), atelier_client::JobError> {
//! let poller = JobPoller::new(PollConfig::default());
//! let provider = eachlabs::prediction_provider(eachlabs::DEFAULT_API_BASE, "key");
//! let request = eachlabs::try_on_request(
//!     "https://cdn/human.png",
//!     "https://cdn/garment.png",
//!     eachlabs::UPLOAD_TRY_ON_PROMPT,
//! );
//!
//! let outcome = poller.submit_and_wait(&provider, &request).await?;
//! println!("{} -> {}", outcome.handle, outcome.image_url);
//! # Ok(())
//! # }
//! ```

pub mod eachlabs;
pub mod error;
pub mod fal;
pub mod nanobanana;
pub mod poller;
pub mod provider;
pub mod storage;

// Re-export commonly used types
pub use error::{ClientError, JobError, Result};
pub use poller::{JobOutcome, JobPoller, JobRequest, PollConfig};
pub use provider::{AsyncJobProvider, Credential};
pub use storage::{FalStorage, ImageFile, Uploader};

use serde_json::Value;

/// Reads a response body as JSON, keeping non-JSON bodies as a string
///
/// Provider error bodies are not always JSON; they are still worth
/// surfacing as diagnostics.
pub(crate) async fn read_body(response: reqwest::Response) -> reqwest::Result<Value> {
    let text = response.text().await?;
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_str(&text).unwrap_or_else(|_| Value::String(text)))
}

/// Checks the status code and returns the decoded body
pub(crate) async fn handle_response(response: reqwest::Response) -> Result<Value> {
    let status = response.status();
    let body = read_body(response).await?;

    if !status.is_success() {
        return Err(ClientError::api_error(status.as_u16(), body));
    }

    Ok(body)
}

/// Joins a base URL and a relative path with exactly one slash
pub(crate) fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
