//! Model Service
//!
//! Synthesizes a full-body fashion model from ethnicity, gender and style.

use atelier_client::fal::{self, FalClient};
use atelier_core::domain::field_path::extract_str;
use atelier_core::dto::model::{GenerateModel, GenerateModelResponse, ModelStyle};
use serde_json::json;

use super::{ServiceError, required};

/// Generate a model image
pub async fn generate_model(
    fal: &FalClient,
    req: GenerateModel,
) -> Result<GenerateModelResponse, ServiceError> {
    let (Some(ethnicity), Some(gender)) = (
        required(req.ethnicity.as_deref()),
        required(req.gender.as_deref()),
    ) else {
        return Err(ServiceError::ValidationError(
            "Missing ethnicity or gender".to_string(),
        ));
    };

    let style = ModelStyle::from_label(req.style.as_deref());
    let prompt = build_prompt(gender, ethnicity, style);
    tracing::debug!("Generating {:?} model", style);

    let output = fal
        .run(
            fal::MODEL_GENERATION,
            &json!({
                "prompt": prompt,
                "num_images": 1,
                "output_format": "png",
                "sync_mode": false,
            }),
        )
        .await?;

    let image_url = extract_str(&output, &fal::generation_paths())
        .map(str::to_string)
        .ok_or_else(|| ServiceError::NoImage {
            message: "Model generation failed: no image in response".to_string(),
            raw: None,
        })?;

    Ok(GenerateModelResponse { image_url })
}

fn build_prompt(gender: &str, ethnicity: &str, style: ModelStyle) -> String {
    format!(
        "full-body fashion model, {}, {} appearance, {}. neutral pose, arms relaxed, photorealistic, high quality",
        gender.to_lowercase(),
        ethnicity.to_lowercase(),
        style.prompt()
    )
}
