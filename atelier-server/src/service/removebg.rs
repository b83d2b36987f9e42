//! Background Removal Service

use atelier_client::fal::{self, FalClient};
use atelier_client::{ImageFile, Uploader};
use atelier_core::domain::data_uri::DataUri;
use atelier_core::domain::field_path::extract_first;
use atelier_core::dto::removebg::{RemoveBackground, RemoveBackgroundResponse};
use serde_json::{Value, json};

use super::{ServiceError, required};

/// Remove the background of an image given as URL or data URI
pub async fn remove_background(
    fal: &FalClient,
    storage: &dyn Uploader,
    req: RemoveBackground,
) -> Result<RemoveBackgroundResponse, ServiceError> {
    let image = required(req.image_ref())
        .ok_or_else(|| ServiceError::ValidationError("Missing or invalid `image`".to_string()))?;

    let image_url = if DataUri::is_data_uri(image) {
        upload_inline(storage, image).await?
    } else {
        image.to_string()
    };

    let output = fal
        .run(
            fal::BACKGROUND_REMOVAL,
            &json!({
                "image_url": image_url,
                "output_format": req.output_format,
                "background": req.background,
                "alpha_matting": req.alpha_matting,
                "sync_mode": req.sync_mode,
            }),
        )
        .await?;

    normalize(&output)
}

async fn upload_inline(storage: &dyn Uploader, image: &str) -> Result<String, ServiceError> {
    let decoded = DataUri::parse(image)
        .map_err(|e| ServiceError::ValidationError(format!("Invalid `image` data URI: {e}")))?;

    let file_name = format!("removebg-input.{}", decoded.extension());
    tracing::debug!("Uploading inline {} image", decoded.mime_type);

    let file = ImageFile::new(decoded.bytes, file_name, decoded.mime_type);
    Ok(storage.upload(file).await?)
}

fn normalize(output: &Value) -> Result<RemoveBackgroundResponse, ServiceError> {
    let image = extract_first(output, &fal::background_removal_image_paths());
    let field = |name: &str| {
        image
            .and_then(|obj| obj.get(name))
            .and_then(Value::as_str)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };

    let response = RemoveBackgroundResponse {
        image_url: field("url"),
        image_data: field("data"),
        content_type: field("content_type"),
        description: output
            .get("description")
            .and_then(Value::as_str)
            .map(str::to_string),
    };

    if response.image_url.is_none() && response.image_data.is_none() {
        return Err(ServiceError::NoImage {
            message: "removebg failed: no image in response".to_string(),
            raw: None,
        });
    }

    Ok(response)
}
