//! `data:` URI decoding for inline images

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use thiserror::Error;

const DEFAULT_MIME: &str = "image/png";

/// Decoded inline image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUri {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Error)]
pub enum DataUriError {
    #[error("data URI has no `,` separator")]
    MissingPayload,

    #[error("invalid base64 payload: {0}")]
    InvalidBase64(#[from] base64::DecodeError),
}

impl DataUri {
    /// Whether the string looks like a `data:` URI rather than a URL
    pub fn is_data_uri(value: &str) -> bool {
        value.starts_with("data:")
    }

    /// Decodes `data:<mime>;base64,<payload>`
    ///
    /// A missing or unparseable mime type falls back to `image/png`.
    pub fn parse(value: &str) -> Result<Self, DataUriError> {
        let (meta, payload) = value
            .split_once(',')
            .ok_or(DataUriError::MissingPayload)?;

        let mime_type = meta
            .strip_prefix("data:")
            .and_then(|rest| rest.split_once(";base64"))
            .map(|(mime, _)| mime.trim())
            .filter(|mime| !mime.is_empty())
            .unwrap_or(DEFAULT_MIME)
            .to_string();

        let bytes = BASE64.decode(payload.trim())?;

        Ok(Self { mime_type, bytes })
    }

    /// File extension used when uploading the decoded bytes
    pub fn extension(&self) -> &'static str {
        if self.mime_type == "image/png" {
            "png"
        } else {
            "jpg"
        }
    }
}
