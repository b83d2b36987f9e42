//! API Module
//!
//! HTTP API layer for the Atelier server.
//! Each submodule handles the endpoint for one capability.

pub mod error;
pub mod health;
pub mod model;
pub mod removebg;
pub mod tryon;

use axum::{
    BoxError, Router,
    error_handling::HandleErrorLayer,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower::timeout::{TimeoutLayer, error::Elapsed};
use tower_http::trace::TraceLayer;

use crate::api::error::ApiError;
use crate::state::AppState;

/// Create the main API router with all endpoints
pub fn create_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;
    let request_timeout = state.config.request_timeout();

    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Image endpoints
        .route("/api/generate-model", post(model::generate_model))
        .route("/api/removebg", post(removebg::remove_background))
        .route("/api/tryon", post(tryon::try_on))
        .route("/api/tryon/url", post(tryon::try_on_by_url))
        // Add state and middleware
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_middleware_error))
                .layer(TimeoutLayer::new(request_timeout)),
        )
        .layer(TraceLayer::new_for_http())
}

/// Turns middleware failures (the request deadline) into API errors
async fn handle_middleware_error(err: BoxError) -> ApiError {
    if err.is::<Elapsed>() {
        ApiError::Timeout("Request deadline exceeded".to_string())
    } else {
        ApiError::InternalError(format!("Unhandled middleware error: {err}"))
    }
}
