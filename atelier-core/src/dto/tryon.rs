//! Try-on DTOs

use serde::{Deserialize, Serialize};

/// Try-on request where both images are already reachable URLs
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TryOnByUrl {
    #[serde(default)]
    pub model_image: Option<String>,
    #[serde(default)]
    pub garment_image: Option<String>,
    #[serde(default)]
    pub prompt: Option<String>,
}

/// Normalized try-on result
///
/// `id` is the provider job handle when the result came from a polled job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TryOnResponse {
    pub image_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}
