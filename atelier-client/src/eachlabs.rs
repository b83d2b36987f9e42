//! Eachlabs prediction API
//!
//! Eachlabs runs `nano-banana-edit` as an asynchronous prediction: a POST
//! returns an `id`, and `GET /prediction/{id}` reports its status.

use atelier_core::domain::field_path::FieldPath;
use serde_json::json;

use crate::poller::JobRequest;
use crate::provider::{AsyncJobProvider, Credential};

pub const DEFAULT_API_BASE: &str = "https://api.eachlabs.ai/v1";

pub const MODEL: &str = "nano-banana-edit";
pub const MODEL_VERSION: &str = "0.0.1";

/// Prompt used when try-on images were uploaded and no prompt was given
pub const UPLOAD_TRY_ON_PROMPT: &str =
    "Realistic try-on; keep body pose, true color, clean e-commerce lighting.";

/// Prompt used when try-on images were given as URLs and no prompt was given
pub const URL_TRY_ON_PROMPT: &str = "Studio-quality AI fashion try-on. Maintain pose, realistic garment fit, true color, soft lighting.";

/// Adapter for the Eachlabs prediction endpoints
pub fn prediction_provider(api_base: &str, api_key: &str) -> AsyncJobProvider {
    let create_url = format!("{}/prediction/", api_base.trim_end_matches('/'));
    let status_url = format!("{create_url}{{id}}");

    AsyncJobProvider::new(
        "eachlabs",
        create_url,
        status_url,
        Credential::header("X-API-Key", api_key),
    )
    .with_output_paths(output_paths())
}

/// Where the result image lives; the nested shape shows up on some model
/// variants
pub fn output_paths() -> Vec<FieldPath> {
    vec![
        FieldPath::key("output").at(0).then("url"),
        FieldPath::key("data").then("output").at(0).then("url"),
    ]
}

/// Prediction body for a two-image try-on
pub fn try_on_request(human_url: &str, garment_url: &str, prompt: &str) -> JobRequest {
    JobRequest::new(json!({
        "model": MODEL,
        "version": MODEL_VERSION,
        "input": {
            "image_urls": [human_url, garment_url],
            "num_images": 1,
            "prompt": prompt,
            "output_format": "jpeg",
            "sync_mode": false,
            "aspect_ratio": "1:1",
            "limit_generations": true,
        },
        "webhook_url": "",
    }))
}
