use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use speakcoach_core::error::{self, ApiError};

use crate::groq::ProviderError;

/// Internal error type that converts to structured API responses
#[derive(Debug)]
pub enum AppError {
    /// Validation error (400)
    Validation {
        message: String,
        field: Option<String>,
        received: Option<serde_json::Value>,
        docs_hint: Option<String>,
    },
    /// Requested resource does not exist (404)
    NotFound { resource: String },
    /// The LLM provider failed or timed out (502). Carries the provider's
    /// status and raw detail so the caller can decide to retry.
    Upstream {
        error: &'static str,
        status: Option<u16>,
        detail: String,
    },
    /// Database error (500)
    Database(sqlx::Error),
    /// Internal error (500)
    Internal(String),
}

impl AppError {
    /// Map a provider failure onto the route-specific upstream label
    /// (e.g. "groq_feedback_failed"). A missing API key is a deployment
    /// problem, not an upstream outage.
    pub fn upstream(label: &'static str, err: ProviderError) -> Self {
        match err {
            ProviderError::Status { status, detail } => AppError::Upstream {
                error: label,
                status: Some(status),
                detail,
            },
            ProviderError::Transport(e) => AppError::Upstream {
                error: label,
                status: None,
                detail: e.to_string(),
            },
            ProviderError::MissingKey => {
                AppError::Internal("GROQ_API_KEY is not configured".to_string())
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let request_id = uuid::Uuid::now_v7().to_string();

        let (status, api_error) = match self {
            AppError::Validation {
                message,
                field,
                received,
                docs_hint,
            } => (
                StatusCode::BAD_REQUEST,
                ApiError {
                    error: error::codes::VALIDATION_FAILED.to_string(),
                    message,
                    field,
                    received,
                    request_id,
                    docs_hint,
                },
            ),
            AppError::NotFound { resource } => (
                StatusCode::NOT_FOUND,
                ApiError {
                    error: error::codes::NOT_FOUND.to_string(),
                    message: format!("{resource} not found"),
                    field: None,
                    received: None,
                    request_id,
                    docs_hint: None,
                },
            ),
            AppError::Upstream {
                error: label,
                status,
                detail,
            } => {
                tracing::error!(label, ?status, "Upstream provider failure: {}", detail);
                (
                    StatusCode::BAD_GATEWAY,
                    ApiError {
                        error: error::codes::UPSTREAM_FAILED.to_string(),
                        message: label.to_string(),
                        field: None,
                        received: Some(serde_json::json!({
                            "status_code": status,
                            "detail": detail,
                        })),
                        request_id,
                        docs_hint: Some(
                            "The language model provider rejected the request or timed out. \
                             Retry shortly."
                                .to_string(),
                        ),
                    },
                )
            }
            AppError::Database(err) => {
                tracing::error!("Database error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiError {
                        error: error::codes::INTERNAL_ERROR.to_string(),
                        message: "An internal error occurred".to_string(),
                        field: None,
                        received: None,
                        request_id,
                        docs_hint: None,
                    },
                )
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiError {
                        error: error::codes::INTERNAL_ERROR.to_string(),
                        message: "An internal error occurred".to_string(),
                        field: None,
                        received: None,
                        request_id,
                        docs_hint: None,
                    },
                )
            }
        };

        (status, Json(api_error)).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Database(err)
    }
}
