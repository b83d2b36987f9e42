//! Nano-Banana try-on proxy
//!
//! A generic proxy that accepts the two try-on images as multipart and
//! answers synchronously.

use atelier_core::domain::field_path::FieldPath;
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use serde_json::Value;

use crate::error::Result;
use crate::provider::Credential;
use crate::storage::ImageFile;
use crate::{handle_response, join_url};

pub const DEFAULT_API_BASE: &str = "https://api.nano-banana.example.com";

/// HTTP client for a Nano-Banana proxy
#[derive(Debug, Clone)]
pub struct NanoBananaClient {
    base_url: String,
    credential: Credential,
    http: Client,
}

impl NanoBananaClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self::with_client(base_url, api_key, Client::new())
    }

    pub fn with_client(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        http: Client,
    ) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            credential: Credential::Bearer(api_key.into()),
            http,
        }
    }

    /// Forwards both images (and the prompt, if any) to `/v1/try-on`
    pub async fn try_on(
        &self,
        human: ImageFile,
        garment: ImageFile,
        prompt: Option<&str>,
    ) -> Result<Value> {
        let mut form = Form::new()
            .part("human_image", file_part(human)?)
            .part("garment_image", file_part(garment)?);
        if let Some(prompt) = prompt.filter(|p| !p.is_empty()) {
            form = form.text("prompt", prompt.to_string());
        }

        let response = self
            .credential
            .apply(self.http.post(join_url(&self.base_url, "v1/try-on")))
            .multipart(form)
            .send()
            .await?;

        handle_response(response).await
    }
}

fn file_part(file: ImageFile) -> Result<Part> {
    Ok(Part::bytes(file.bytes)
        .file_name(file.file_name)
        .mime_str(&file.content_type)?)
}

/// Candidate image references in a proxy response
pub fn output_paths() -> Vec<FieldPath> {
    vec![
        FieldPath::key("image_url"),
        FieldPath::key("result").then("url"),
        FieldPath::key("data").then("image_url"),
        FieldPath::key("data").then("image").then("url"),
    ]
}
