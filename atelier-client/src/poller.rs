//! Job poller
//!
//! Submits a prediction to an asynchronous-job provider and polls its
//! status endpoint until the job succeeds, fails, or the attempt budget
//! runs out. Each call runs its own loop; nothing is shared between calls
//! except the HTTP connection pool.

use atelier_core::domain::field_path::extract_str;
use atelier_core::domain::job::{JobHandle, JobStatus};
use reqwest::Client;
use serde_json::Value;
use tokio::time::{self, Duration};
use tracing::{debug, info, warn};

use crate::error::JobError;
use crate::provider::AsyncJobProvider;
use crate::read_body;

/// Default pause between status checks
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(3000);

/// Default number of status checks before giving up
pub const DEFAULT_MAX_ATTEMPTS: u32 = 20;

/// Polling budget
///
/// Waiting is bounded by [`PollConfig::worst_case_wait`]; the enclosing
/// request deadline must exceed it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    /// Fixed pause before every status check after the first
    pub interval: Duration,
    /// Maximum number of status checks
    pub max_attempts: u32,
}

impl PollConfig {
    pub fn new(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts,
        }
    }

    /// Upper bound on time spent waiting: attempts x interval
    ///
    /// `None` when the product overflows a [`Duration`].
    pub fn worst_case_wait(&self) -> Option<Duration> {
        self.interval.checked_mul(self.max_attempts)
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_INTERVAL, DEFAULT_MAX_ATTEMPTS)
    }
}

/// Provider-specific job body, built once per incoming call
#[derive(Debug, Clone, PartialEq)]
pub struct JobRequest(Value);

impl JobRequest {
    pub fn new(body: Value) -> Self {
        Self(body)
    }

    pub fn body(&self) -> &Value {
        &self.0
    }
}

/// Result of a job that reached `succeeded` with an image reference
#[derive(Debug, Clone)]
pub struct JobOutcome {
    pub handle: JobHandle,
    pub image_url: String,
    /// Full terminal status payload
    pub payload: Value,
}

/// Submits jobs and waits for them to finish
#[derive(Debug, Clone)]
pub struct JobPoller {
    http: Client,
    config: PollConfig,
}

impl JobPoller {
    /// Creates a poller with its own HTTP client
    pub fn new(config: PollConfig) -> Self {
        Self::with_client(Client::new(), config)
    }

    /// Creates a poller sharing an existing HTTP client
    pub fn with_client(http: Client, config: PollConfig) -> Self {
        Self { http, config }
    }

    pub fn config(&self) -> &PollConfig {
        &self.config
    }

    /// Creates a job, waits for a terminal status, and extracts the image
    /// reference from the result
    ///
    /// # Errors
    /// * [`JobError::CreateFailed`] - creation rejected or no handle returned; never retried
    /// * [`JobError::JobFailed`] - provider reported `failed`; polling stops immediately
    /// * [`JobError::Timeout`] - no terminal status within the attempt budget
    /// * [`JobError::MissingOutput`] - `succeeded` but no candidate path resolved
    /// * [`JobError::Transport`] / [`JobError::InvalidResponse`] - fatal for this call
    pub async fn submit_and_wait(
        &self,
        provider: &AsyncJobProvider,
        request: &JobRequest,
    ) -> Result<JobOutcome, JobError> {
        let handle = self.create(provider, request).await?;
        let payload = self.wait_for(provider, &handle).await?;

        let Some(image_url) = extract_str(&payload, provider.output_paths()).map(str::to_string)
        else {
            warn!(
                "{} job {} succeeded without an image reference",
                provider.name(),
                handle
            );
            return Err(JobError::MissingOutput { handle, payload });
        };

        Ok(JobOutcome {
            handle,
            image_url,
            payload,
        })
    }

    /// Create phase: one POST, no retry
    async fn create(
        &self,
        provider: &AsyncJobProvider,
        request: &JobRequest,
    ) -> Result<JobHandle, JobError> {
        let response = provider
            .credential()
            .apply(self.http.post(provider.create_url()))
            .json(request.body())
            .send()
            .await?;

        let status = response.status();
        let body = read_body(response).await?;

        if !status.is_success() {
            warn!(
                "{} rejected job creation (status {})",
                provider.name(),
                status
            );
            return Err(JobError::CreateFailed {
                status: status.as_u16(),
                body,
            });
        }

        match provider.handle_from(&body) {
            Some(handle) => {
                info!("{} job created: {}", provider.name(), handle);
                Ok(handle)
            }
            None => {
                warn!("{} accepted job creation without an id", provider.name());
                Err(JobError::CreateFailed {
                    status: status.as_u16(),
                    body,
                })
            }
        }
    }

    /// Poll phase: fixed interval, fixed attempt budget
    async fn wait_for(
        &self,
        provider: &AsyncJobProvider,
        handle: &JobHandle,
    ) -> Result<Value, JobError> {
        let url = provider.status_url(handle);

        for attempt in 1..=self.config.max_attempts {
            if attempt > 1 {
                time::sleep(self.config.interval).await;
            }

            let response = provider
                .credential()
                .apply(self.http.get(&url))
                .send()
                .await?;
            let text = response.text().await?;
            let payload: Value = serde_json::from_str(&text)
                .map_err(|e| JobError::InvalidResponse(format!("{e}: {text}")))?;

            let status = provider.status_from(&payload);
            debug!(
                "{} job {} attempt {}/{}: {:?}",
                provider.name(),
                handle,
                attempt,
                self.config.max_attempts,
                status
            );

            match status {
                JobStatus::Succeeded => {
                    info!(
                        "{} job {} succeeded after {} status check(s)",
                        provider.name(),
                        handle,
                        attempt
                    );
                    return Ok(payload);
                }
                JobStatus::Failed => {
                    warn!("{} job {} failed", provider.name(), handle);
                    return Err(JobError::JobFailed {
                        handle: handle.clone(),
                        payload,
                    });
                }
                JobStatus::Pending => {}
            }
        }

        warn!(
            "{} job {} still pending after {} status checks",
            provider.name(),
            handle,
            self.config.max_attempts
        );
        Err(JobError::Timeout {
            handle: handle.clone(),
            attempts: self.config.max_attempts,
        })
    }
}
