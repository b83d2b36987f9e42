//! Background Removal API Handler

use axum::{Json, extract::State, extract::rejection::JsonRejection};
use atelier_core::dto::removebg::{RemoveBackground, RemoveBackgroundResponse};

use crate::api::error::{ApiError, ApiResult};
use crate::service::removebg_service;
use crate::state::AppState;

/// POST /api/removebg
/// Remove the background of an image URL or `data:` URI
pub async fn remove_background(
    State(state): State<AppState>,
    payload: Result<Json<RemoveBackground>, JsonRejection>,
) -> ApiResult<Json<RemoveBackgroundResponse>> {
    let (Some(fal), Some(storage)) = (state.fal.as_ref(), state.storage.as_deref()) else {
        return Err(ApiError::ConfigMissing(
            "FAL_KEY not configured on server".to_string(),
        ));
    };
    let Json(req) = payload?;

    tracing::info!("Removing background");

    let response = removebg_service::remove_background(fal, storage, req).await?;

    Ok(Json(response))
}
