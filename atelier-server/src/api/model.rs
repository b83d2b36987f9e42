//! Model Synthesis API Handler

use axum::{Json, extract::State, extract::rejection::JsonRejection};
use atelier_core::dto::model::{GenerateModel, GenerateModelResponse};

use crate::api::error::{ApiError, ApiResult};
use crate::service::model_service;
use crate::state::AppState;

/// POST /api/generate-model
/// Synthesize a full-body fashion model image
pub async fn generate_model(
    State(state): State<AppState>,
    payload: Result<Json<GenerateModel>, JsonRejection>,
) -> ApiResult<Json<GenerateModelResponse>> {
    let fal = state.fal.as_ref().ok_or_else(|| {
        ApiError::ConfigMissing("FAL_KEY is not configured on server".to_string())
    })?;
    let Json(req) = payload?;

    tracing::info!("Generating model image");

    let response = model_service::generate_model(fal, req).await?;

    Ok(Json(response))
}
