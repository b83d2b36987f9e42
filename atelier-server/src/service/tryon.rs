//! Try-on Service
//!
//! Dresses the person in one image with the garment in another, through
//! whichever backend was selected at startup.

use atelier_client::fal::{self, FalClient};
use atelier_client::nanobanana::{self, NanoBananaClient};
use atelier_client::{AsyncJobProvider, ClientError, ImageFile, JobPoller, Uploader, eachlabs};
use atelier_core::domain::field_path::extract_str;
use atelier_core::dto::tryon::{TryOnByUrl, TryOnResponse};
use serde_json::json;

use super::{ServiceError, required};
use crate::config::TryOnProvider;
use crate::state::AppState;

const FAL_TRY_ON_PROMPT: &str = "Dress the person with the garment realistically; preserve body/pose; consistent lighting; e-commerce look.";

/// A validated try-on form
#[derive(Debug, Clone)]
pub struct TryOnInput {
    pub human: ImageFile,
    pub garment: ImageFile,
    pub meta_prompt: Option<String>,
}

impl TryOnInput {
    fn prompt_or(&self, default: &'static str) -> String {
        required(self.meta_prompt.as_deref())
            .unwrap_or(default)
            .to_string()
    }
}

/// Run a try-on with the configured backend
pub async fn try_on(state: &AppState, input: TryOnInput) -> Result<TryOnResponse, ServiceError> {
    match state.tryon_provider() {
        TryOnProvider::Eachlabs => {
            let provider = eachlabs_provider(state)?;
            let storage = storage(state)?;
            let prompt = input.prompt_or(eachlabs::UPLOAD_TRY_ON_PROMPT);
            let (human_url, garment_url) = upload_pair(storage, input.human, input.garment).await?;
            run_eachlabs(&state.poller, provider, &human_url, &garment_url, &prompt).await
        }
        TryOnProvider::Fal => {
            let fal = state
                .fal
                .as_ref()
                .ok_or_else(|| ServiceError::MissingCredential("FAL_KEY missing".to_string()))?;
            let storage = storage(state)?;
            let prompt = input.prompt_or(FAL_TRY_ON_PROMPT);
            let (human_url, garment_url) = upload_pair(storage, input.human, input.garment).await?;
            run_fal(fal, &human_url, &garment_url, &prompt).await
        }
        TryOnProvider::NanoBanana => {
            let client = state.nanobanana.as_ref().ok_or_else(|| {
                ServiceError::MissingCredential(
                    "NANOBANANA_API_URL or NANOBANANA_API_KEY missing".to_string(),
                )
            })?;
            run_nanobanana(client, input).await
        }
    }
}

/// Run an Eachlabs try-on on images that are already URLs
pub async fn try_on_by_url(
    state: &AppState,
    req: TryOnByUrl,
) -> Result<TryOnResponse, ServiceError> {
    let (Some(model_image), Some(garment_image)) = (
        required(req.model_image.as_deref()),
        required(req.garment_image.as_deref()),
    ) else {
        return Err(ServiceError::ValidationError(
            "Missing model_image or garment_image".to_string(),
        ));
    };

    let provider = eachlabs_provider(state)?;
    let prompt = required(req.prompt.as_deref()).unwrap_or(eachlabs::URL_TRY_ON_PROMPT);

    run_eachlabs(&state.poller, provider, model_image, garment_image, prompt).await
}

fn eachlabs_provider(state: &AppState) -> Result<&AsyncJobProvider, ServiceError> {
    state
        .eachlabs
        .as_ref()
        .ok_or_else(|| ServiceError::MissingCredential("EACHLABS_KEY missing".to_string()))
}

fn storage(state: &AppState) -> Result<&dyn Uploader, ServiceError> {
    state
        .storage
        .as_deref()
        .ok_or_else(|| ServiceError::NotConfigured("FAL_KEY is not configured on server".to_string()))
}

async fn upload_pair(
    storage: &dyn Uploader,
    human: ImageFile,
    garment: ImageFile,
) -> Result<(String, String), ServiceError> {
    let (human_url, garment_url) =
        tokio::try_join!(storage.upload(human), storage.upload(garment))?;
    Ok((human_url, garment_url))
}

async fn run_eachlabs(
    poller: &JobPoller,
    provider: &AsyncJobProvider,
    human_url: &str,
    garment_url: &str,
    prompt: &str,
) -> Result<TryOnResponse, ServiceError> {
    let request = eachlabs::try_on_request(human_url, garment_url, prompt);
    let outcome = poller.submit_and_wait(provider, &request).await?;

    Ok(TryOnResponse {
        image_url: outcome.image_url,
        id: Some(outcome.handle.to_string()),
    })
}

async fn run_fal(
    fal: &FalClient,
    human_url: &str,
    garment_url: &str,
    prompt: &str,
) -> Result<TryOnResponse, ServiceError> {
    let output = fal
        .run(
            fal::TRY_ON_EDIT,
            &json!({ "prompt": prompt, "image_urls": [human_url, garment_url] }),
        )
        .await?;

    match extract_str(&output, &fal::try_on_paths()) {
        Some(url) => Ok(TryOnResponse {
            image_url: url.to_string(),
            id: None,
        }),
        None => Err(ServiceError::NoImage {
            message: "No image from FAL nano-banana/edit".to_string(),
            raw: Some(output),
        }),
    }
}

async fn run_nanobanana(
    client: &NanoBananaClient,
    input: TryOnInput,
) -> Result<TryOnResponse, ServiceError> {
    let output = client
        .try_on(input.human, input.garment, input.meta_prompt.as_deref())
        .await
        .map_err(|err| match err {
            ClientError::ApiError { status, ref body } => ServiceError::Upstream {
                status,
                message: err
                    .upstream_message()
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("Nano-Banana error ({status})")),
                detail: body.clone(),
            },
            other => ServiceError::Provider(other),
        })?;

    match extract_str(&output, &nanobanana::output_paths()) {
        Some(url) => Ok(TryOnResponse {
            image_url: url.to_string(),
            id: None,
        }),
        None => Err(ServiceError::NoImage {
            message: "No image_url in Nano-Banana response".to_string(),
            raw: Some(output),
        }),
    }
}
