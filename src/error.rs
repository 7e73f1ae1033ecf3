//! Error types for the Podcast Workshop server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::generation::GenerationError;
use crate::history::HistoryError;
use crate::workflow::WorkflowError;

/// Application-wide result type
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Workflow(#[from] WorkflowError),
}

impl From<HistoryError> for AppError {
    fn from(e: HistoryError) -> Self {
        AppError::Workflow(WorkflowError::History(e))
    }
}

impl From<GenerationError> for AppError {
    fn from(e: GenerationError) -> Self {
        AppError::Workflow(WorkflowError::Generation(e))
    }
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg.clone()),
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                )
            }
            AppError::Workflow(e) => workflow_status(e),
        };

        let body = Json(ErrorResponse {
            error: error_type.to_string(),
            message,
            details: if cfg!(debug_assertions) {
                Some(self.to_string())
            } else {
                None
            },
        });

        (status, body).into_response()
    }
}

fn workflow_status(e: &WorkflowError) -> (StatusCode, &'static str, String) {
    let message = e.to_string();
    match e {
        WorkflowError::FileTooLarge { .. } => (StatusCode::PAYLOAD_TOO_LARGE, "file_too_large", message),
        WorkflowError::NoBookLoaded => (StatusCode::CONFLICT, "no_book_loaded", message),
        WorkflowError::NoCover => (StatusCode::CONFLICT, "no_cover", message),
        WorkflowError::NotEditing => (StatusCode::CONFLICT, "not_editing", message),
        WorkflowError::Busy => (StatusCode::CONFLICT, "generation_in_progress", message),
        WorkflowError::InvalidStep(_) => (StatusCode::BAD_REQUEST, "invalid_step", message),
        WorkflowError::UnknownHistoryItem(_) => (StatusCode::NOT_FOUND, "not_found", message),
        WorkflowError::Extraction(_) => (StatusCode::UNPROCESSABLE_ENTITY, "extraction_error", message),
        WorkflowError::Cover(_) => (StatusCode::UNPROCESSABLE_ENTITY, "invalid_cover", message),
        WorkflowError::Generation(_) => (StatusCode::BAD_GATEWAY, "generation_error", message),
        WorkflowError::History(err) => {
            tracing::error!("History error: {}", err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "history_error",
                "Failed to update history".to_string(),
            )
        }
        WorkflowError::Task(err) => {
            tracing::error!("Background task error: {}", err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "An internal error occurred".to_string(),
            )
        }
    }
}
