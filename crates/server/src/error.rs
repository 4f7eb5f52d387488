// crates/server/src/error.rs
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use atc_deck_core::{CatalogError, SupervisorError};

/// Structured JSON error response for API errors
#[derive(Debug, Serialize)]
#[cfg_attr(test, derive(serde::Deserialize))]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            detail: None,
        }
    }

    pub fn with_detail(error: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            detail: Some(detail.into()),
        }
    }
}

/// API error types that map to HTTP status codes
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Supervisor error: {0}")]
    Supervisor(#[from] SupervisorError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_response) = match &self {
            ApiError::Supervisor(SupervisorError::AgentAlreadyRunning(session)) => {
                tracing::warn!(session = %session, "start rejected, agent already running");
                (
                    StatusCode::BAD_REQUEST,
                    ErrorResponse::with_detail("Agent already running", format!("session {session}")),
                )
            }
            ApiError::Supervisor(err) => {
                tracing::error!(error = %err, "supervisor operation failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::with_detail("Agent startup failed", err.to_string()),
                )
            }
            ApiError::Catalog(CatalogError::SessionNotFound(id)) => {
                tracing::warn!(session_id = %id, "session not found");
                (
                    StatusCode::NOT_FOUND,
                    ErrorResponse::with_detail("Session not found", id.clone()),
                )
            }
            ApiError::Catalog(err @ CatalogError::Io { .. }) => {
                tracing::error!(error = %err, "failed to read session events");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::with_detail("Failed to read events", err.to_string()),
                )
            }
            ApiError::Catalog(err @ CatalogError::Metadata(_)) => {
                tracing::error!(error = %err, "failed to load session metadata");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::with_detail("Failed to load session metadata", err.to_string()),
                )
            }
            ApiError::Internal(msg) => {
                tracing::error!(message = %msg, "internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new("Internal server error"),
                )
            }
        };

        (status, Json(error_response)).into_response()
    }
}

/// Result type alias for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
