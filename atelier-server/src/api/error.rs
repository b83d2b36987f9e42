//! API Error Handling
//!
//! Every failure leaves a handler as a JSON body `{error, detail?, raw?}`
//! with a status code chosen by kind.

use atelier_client::{ClientError, JobError};
use atelier_core::dto::error::ErrorBody;
use axum::{
    Json,
    extract::multipart::{MultipartError, MultipartRejection},
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::Value;

use crate::service::ServiceError;

/// API error type
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Unauthorized(String),
    ConfigMissing(String),
    Upstream {
        status: StatusCode,
        message: String,
        detail: Option<Value>,
    },
    MissingOutput {
        message: String,
        raw: Option<Value>,
    },
    Timeout(String),
    InternalError(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, ErrorBody::new(msg)),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, ErrorBody::new(msg)),
            ApiError::ConfigMissing(msg) => {
                tracing::error!("Configuration missing: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, ErrorBody::new(msg))
            }
            ApiError::Upstream {
                status,
                message,
                detail,
            } => {
                tracing::error!("Upstream error ({}): {} {:?}", status, message, detail);
                let mut body = ErrorBody::new(message);
                body.detail = detail;
                (status, body)
            }
            ApiError::MissingOutput { message, raw } => {
                tracing::error!("{}: {:?}", message, raw);
                let mut body = ErrorBody::new(message);
                body.raw = raw;
                (StatusCode::INTERNAL_SERVER_ERROR, body)
            }
            ApiError::Timeout(msg) => {
                tracing::warn!("{}", msg);
                (StatusCode::GATEWAY_TIMEOUT, ErrorBody::new(msg))
            }
            ApiError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, ErrorBody::new(msg))
            }
        };

        (status, Json(body)).into_response()
    }
}

fn upstream(message: &str, detail: Value) -> ApiError {
    ApiError::Upstream {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        message: message.to_string(),
        detail: Some(detail),
    }
}

impl From<JobError> for ApiError {
    fn from(err: JobError) -> Self {
        match err {
            JobError::CreateFailed { body, .. } => upstream("Prediction create failed", body),
            JobError::JobFailed { payload, .. } => upstream("Prediction failed", payload),
            JobError::Timeout { .. } => {
                ApiError::Timeout("Prediction timeout or no result".to_string())
            }
            JobError::MissingOutput { payload, .. } => ApiError::MissingOutput {
                message: "No image URL found".to_string(),
                raw: Some(payload),
            },
            err @ (JobError::Transport(_) | JobError::InvalidResponse(_)) => {
                ApiError::InternalError(err.to_string())
            }
        }
    }
}

impl From<ClientError> for ApiError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::ApiError { ref body, .. } => {
                let message = err
                    .upstream_message()
                    .map(str::to_string)
                    .unwrap_or_else(|| err.to_string());
                upstream(&message, body.clone())
            }
            other => ApiError::InternalError(other.to_string()),
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::ValidationError(msg) => ApiError::BadRequest(msg),
            ServiceError::MissingCredential(msg) => ApiError::Unauthorized(msg),
            ServiceError::NotConfigured(msg) => ApiError::ConfigMissing(msg),
            ServiceError::Job(err) => err.into(),
            ServiceError::Provider(err) => err.into(),
            ServiceError::Upstream {
                status,
                message,
                detail,
            } => ApiError::Upstream {
                status: StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY),
                message,
                detail: Some(detail),
            },
            ServiceError::NoImage { message, raw } => ApiError::MissingOutput { message, raw },
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        ApiError::BadRequest(err.body_text())
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use atelier_core::domain::job::JobHandle;
    use serde_json::json;

    fn handle() -> JobHandle {
        JobHandle::new("abc123").unwrap()
    }

    #[test]
    fn test_job_error_status_codes() {
        let cases = [
            (
                JobError::CreateFailed {
                    status: 429,
                    body: json!({}),
                },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                JobError::JobFailed {
                    handle: handle(),
                    payload: json!({}),
                },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                JobError::Timeout {
                    handle: handle(),
                    attempts: 20,
                },
                StatusCode::GATEWAY_TIMEOUT,
            ),
            (
                JobError::MissingOutput {
                    handle: handle(),
                    payload: json!({}),
                },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(ApiError::from(err).into_response().status(), expected);
        }
    }

    #[test]
    fn test_service_error_status_codes() {
        let status = |err: ServiceError| ApiError::from(err).into_response().status();

        assert_eq!(
            status(ServiceError::ValidationError("x".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status(ServiceError::MissingCredential("x".into())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status(ServiceError::NotConfigured("x".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status(ServiceError::Upstream {
                status: 403,
                message: "forbidden".into(),
                detail: json!({}),
            }),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn test_client_error_uses_upstream_message() {
        let err = ApiError::from(ClientError::api_error(
            500,
            json!({ "message": "model overloaded" }),
        ));
        match err {
            ApiError::Upstream {
                message, detail, ..
            } => {
                assert_eq!(message, "model overloaded");
                assert_eq!(detail, Some(json!({ "message": "model overloaded" })));
            }
            other => panic!("expected Upstream, got {other:?}"),
        }
    }
}
