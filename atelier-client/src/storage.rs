//! File storage upload
//!
//! Try-on providers take image URLs, not bytes, so uploaded images are
//! first pushed to storage. The rest of the code only sees "bytes in,
//! URL out" through [`Uploader`].

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ClientError, Result};
use crate::provider::Credential;
use crate::{handle_response, join_url};

pub const DEFAULT_STORAGE_BASE: &str = "https://rest.alpha.fal.ai";

/// A binary image with the metadata needed to store or forward it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub content_type: String,
}

impl ImageFile {
    pub fn new(
        bytes: Vec<u8>,
        file_name: impl Into<String>,
        content_type: impl Into<String>,
    ) -> Self {
        Self {
            bytes,
            file_name: file_name.into(),
            content_type: content_type.into(),
        }
    }
}

/// Upload binary, get back a publicly reachable URL
#[async_trait]
pub trait Uploader: Send + Sync {
    async fn upload(&self, file: ImageFile) -> Result<String>;
}

#[derive(Debug, Serialize)]
struct InitiateUpload<'a> {
    file_name: &'a str,
    content_type: &'a str,
}

#[derive(Debug, Deserialize)]
struct InitiatedUpload {
    upload_url: String,
    file_url: String,
}

/// fal CDN storage
///
/// Two steps: initiate to obtain a signed upload URL, then PUT the bytes.
#[derive(Debug, Clone)]
pub struct FalStorage {
    base_url: String,
    credential: Credential,
    http: Client,
}

impl FalStorage {
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
            credential: Credential::FalKey(api_key.into()),
            http,
        }
    }
}

#[async_trait]
impl Uploader for FalStorage {
    async fn upload(&self, file: ImageFile) -> Result<String> {
        let url = join_url(&self.base_url, "storage/upload/initiate?storage_type=fal-cdn-v3");

        let response = self
            .credential
            .apply(self.http.post(&url))
            .json(&InitiateUpload {
                file_name: &file.file_name,
                content_type: &file.content_type,
            })
            .send()
            .await?;

        let body = handle_response(response).await?;
        let initiated: InitiatedUpload = serde_json::from_value(body)
            .map_err(|e| ClientError::ParseError(format!("upload initiate response: {}", e)))?;

        debug!("Uploading {} ({} bytes)", file.file_name, file.bytes.len());

        let response = self
            .http
            .put(&initiated.upload_url)
            .header(CONTENT_TYPE, file.content_type)
            .body(file.bytes)
            .send()
            .await?;
        handle_response(response).await?;

        Ok(initiated.file_url)
    }
}
