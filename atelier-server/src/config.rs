//! Server configuration
//!
//! Provider credentials, provider selection, endpoint overrides and the
//! polling budget. Read once at startup from flags or environment
//! variables, validated, then shared read-only with every request.

use std::time::Duration;

use atelier_client::{PollConfig, eachlabs, fal, nanobanana, storage};
use clap::{Parser, ValueEnum};

/// Backend used by the try-on endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TryOnProvider {
    /// Eachlabs asynchronous prediction, polled until done
    Eachlabs,
    /// fal `nano-banana/edit`, synchronous
    Fal,
    /// Generic Nano-Banana multipart proxy
    #[value(name = "nanobanana")]
    NanoBanana,
}

/// Server configuration
#[derive(Debug, Clone, Parser)]
#[command(name = "atelier-server")]
#[command(about = "Image generation backend for the Atelier frontend", long_about = None)]
pub struct Config {
    /// Address to listen on
    #[arg(long, env = "ATELIER_BIND_ADDR", default_value = "0.0.0.0:8080")]
    pub bind_addr: String,

    /// Credential for fal (model synthesis, background removal, storage)
    #[arg(long, env = "FAL_KEY", hide_env_values = true)]
    pub fal_key: Option<String>,

    /// Credential for Eachlabs try-on
    #[arg(long, env = "EACHLABS_KEY", hide_env_values = true)]
    pub eachlabs_key: Option<String>,

    /// Which backend serves `/api/tryon`
    #[arg(
        long,
        env = "TRYON_PROVIDER",
        value_enum,
        ignore_case = true,
        default_value_t = TryOnProvider::Eachlabs
    )]
    pub tryon_provider: TryOnProvider,

    /// Base URL of the Nano-Banana proxy
    #[arg(long, env = "NANOBANANA_API_URL", default_value = nanobanana::DEFAULT_API_BASE)]
    pub nanobanana_api_url: String,

    /// Credential for the Nano-Banana proxy
    #[arg(long, env = "NANOBANANA_API_KEY", hide_env_values = true)]
    pub nanobanana_api_key: Option<String>,

    #[arg(long, env = "FAL_API_BASE", default_value = fal::DEFAULT_API_BASE)]
    pub fal_api_base: String,

    #[arg(long, env = "FAL_STORAGE_BASE", default_value = storage::DEFAULT_STORAGE_BASE)]
    pub fal_storage_base: String,

    #[arg(long, env = "EACHLABS_API_BASE", default_value = eachlabs::DEFAULT_API_BASE)]
    pub eachlabs_api_base: String,

    /// Pause between prediction status checks, in milliseconds
    #[arg(long, env = "POLL_INTERVAL_MS", default_value_t = 3000)]
    pub poll_interval_ms: u64,

    /// Status checks before a prediction is reported as timed out
    #[arg(long, env = "POLL_MAX_ATTEMPTS", default_value_t = 20)]
    pub poll_max_attempts: u32,

    /// Deadline for a whole request; must exceed the poll budget
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value_t = 90)]
    pub request_timeout_secs: u64,

    /// Largest accepted request body (multipart uploads included)
    #[arg(long, env = "MAX_UPLOAD_BYTES", default_value_t = 20 * 1024 * 1024)]
    pub max_upload_bytes: usize,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl Config {
    pub fn fal_key(&self) -> Option<&str> {
        non_empty(&self.fal_key)
    }

    pub fn eachlabs_key(&self) -> Option<&str> {
        non_empty(&self.eachlabs_key)
    }

    pub fn nanobanana_api_key(&self) -> Option<&str> {
        non_empty(&self.nanobanana_api_key)
    }

    pub fn poll_config(&self) -> PollConfig {
        PollConfig::new(
            Duration::from_millis(self.poll_interval_ms),
            self.poll_max_attempts,
        )
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        for (name, url) in [
            ("fal_api_base", &self.fal_api_base),
            ("fal_storage_base", &self.fal_storage_base),
            ("eachlabs_api_base", &self.eachlabs_api_base),
            ("nanobanana_api_url", &self.nanobanana_api_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                anyhow::bail!("{name} must start with http:// or https://");
            }
        }

        if self.poll_interval_ms == 0 {
            anyhow::bail!("poll_interval_ms must be greater than 0");
        }

        if self.poll_max_attempts == 0 {
            anyhow::bail!("poll_max_attempts must be greater than 0");
        }

        if self.max_upload_bytes == 0 {
            anyhow::bail!("max_upload_bytes must be greater than 0");
        }

        // The request deadline would otherwise race the poller.
        let Some(budget) = self.poll_config().worst_case_wait() else {
            anyhow::bail!(
                "poll budget overflows: {} attempts x {}ms",
                self.poll_max_attempts,
                self.poll_interval_ms
            );
        };
        if self.request_timeout() <= budget {
            anyhow::bail!(
                "request_timeout_secs ({}s) must exceed the poll budget ({}s)",
                self.request_timeout_secs,
                budget.as_secs_f64()
            );
        }

        Ok(())
    }

    /// Logs credentials the selected endpoints will need but are absent
    pub fn warn_on_missing_credentials(&self) {
        if self.fal_key().is_none() {
            tracing::warn!(
                "FAL_KEY not set: model synthesis, background removal and uploads will fail"
            );
        }

        match self.tryon_provider {
            TryOnProvider::Eachlabs if self.eachlabs_key().is_none() => {
                tracing::warn!("EACHLABS_KEY not set: try-on requests will be rejected")
            }
            TryOnProvider::NanoBanana if self.nanobanana_api_key().is_none() => {
                tracing::warn!("NANOBANANA_API_KEY not set: try-on requests will be rejected")
            }
            _ => {}
        }
    }
}
