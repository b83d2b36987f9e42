//! Try-on API Handlers

use atelier_client::ImageFile;
use atelier_core::dto::tryon::{TryOnByUrl, TryOnResponse};
use axum::{
    Json,
    extract::rejection::JsonRejection,
    extract::{Multipart, State, multipart::MultipartRejection},
};

use crate::api::error::{ApiError, ApiResult};
use crate::service::tryon_service::{self, TryOnInput};
use crate::state::AppState;

const DEFAULT_CONTENT_TYPE: &str = "image/png";

/// POST /api/tryon
/// Multipart form with `human_image`, `garment_image` and optional `meta_prompt`
pub async fn try_on(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<TryOnResponse>> {
    let input = read_form(multipart?).await?;

    tracing::info!(
        "Try-on via {:?} ({} + {} bytes)",
        state.tryon_provider(),
        input.human.bytes.len(),
        input.garment.bytes.len()
    );

    let response = tryon_service::try_on(&state, input).await?;

    Ok(Json(response))
}

/// POST /api/tryon/url
/// JSON `{model_image, garment_image, prompt?}` with images given as URLs
pub async fn try_on_by_url(
    State(state): State<AppState>,
    payload: Result<Json<TryOnByUrl>, JsonRejection>,
) -> ApiResult<Json<TryOnResponse>> {
    let Json(req) = payload?;

    tracing::info!("Try-on from URLs via eachlabs");

    let response = tryon_service::try_on_by_url(&state, req).await?;

    Ok(Json(response))
}

/// Reads the try-on form; only fields sent as files count as images
async fn read_form(mut multipart: Multipart) -> ApiResult<TryOnInput> {
    let mut human = None;
    let mut garment = None;
    let mut meta_prompt = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "human_image" | "garment_image" => {
                let Some(file_name) = field.file_name().map(str::to_string) else {
                    continue;
                };
                let file_name = if file_name.is_empty() {
                    format!("{}.png", name.trim_end_matches("_image"))
                } else {
                    file_name
                };
                let content_type = field
                    .content_type()
                    .unwrap_or(DEFAULT_CONTENT_TYPE)
                    .to_string();
                let bytes = field.bytes().await?.to_vec();
                let file = ImageFile::new(bytes, file_name, content_type);

                if name == "human_image" {
                    human = Some(file);
                } else {
                    garment = Some(file);
                }
            }
            "meta_prompt" => meta_prompt = Some(field.text().await?),
            _ => {}
        }
    }

    let (Some(human), Some(garment)) = (human, garment) else {
        return Err(ApiError::BadRequest("Missing files".to_string()));
    };

    Ok(TryOnInput {
        human,
        garment,
        meta_prompt,
    })
}
