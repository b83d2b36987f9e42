//! fal model API
//!
//! fal models are invoked synchronously through `fal.run`: one POST with
//! the model input, and the response body is the model output.

use atelier_core::domain::field_path::FieldPath;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use crate::error::Result;
use crate::provider::Credential;
use crate::{handle_response, join_url};

pub const DEFAULT_API_BASE: &str = "https://fal.run";

/// Text-to-image model used for fashion model synthesis
pub const MODEL_GENERATION: &str = "fal-ai/nano-banana";
/// Background removal model
pub const BACKGROUND_REMOVAL: &str = "fal-ai/transparent-background";
/// Image-edit model used for fal try-on
pub const TRY_ON_EDIT: &str = "fal-ai/nano-banana/edit";

/// HTTP client for `fal.run`
#[derive(Debug, Clone)]
pub struct FalClient {
    api_base: String,
    credential: Credential,
    http: Client,
}

impl FalClient {
    /// Create a new fal client
    ///
    /// # Arguments
    /// * `api_base` - Base URL (e.g., "https://fal.run")
    /// * `api_key` - The `FAL_KEY` credential
    pub fn new(api_base: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self::with_client(api_base, api_key, Client::new())
    }

    pub fn with_client(
        api_base: impl Into<String>,
        api_key: impl Into<String>,
        http: Client,
    ) -> Self {
        let api_base = api_base.into();
        Self {
            api_base: api_base.trim_end_matches('/').to_string(),
            credential: Credential::FalKey(api_key.into()),
            http,
        }
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Runs a model and returns its output payload
    pub async fn run(&self, model_id: &str, input: &Value) -> Result<Value> {
        let url = join_url(&self.api_base, model_id);
        debug!("Running fal model {}", model_id);

        let response = self
            .credential
            .apply(self.http.post(&url))
            .json(input)
            .send()
            .await?;

        handle_response(response).await
    }
}

/// Candidate image references in a model-generation output
pub fn generation_paths() -> Vec<FieldPath> {
    vec![
        FieldPath::key("images").at(0).then("url"),
        FieldPath::key("images").at(0).then("data"),
        FieldPath::key("image").then("url"),
        FieldPath::key("image").then("data"),
        FieldPath::key("output").at(0).then("url"),
        FieldPath::key("output").at(0).then("data"),
    ]
}

/// Candidate image references in a `nano-banana/edit` output
pub fn try_on_paths() -> Vec<FieldPath> {
    vec![
        FieldPath::key("images").at(0).then("url"),
        FieldPath::key("image").then("url"),
    ]
}

/// Candidate image objects in a background-removal output
pub fn background_removal_image_paths() -> Vec<FieldPath> {
    vec![FieldPath::key("image"), FieldPath::key("images").at(0)]
}
