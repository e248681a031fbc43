use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::models::request::ProcessingStatus;
use crate::models::webhook::FieldErrors;
use crate::services::queue::QueueError;
use crate::services::report::ReportError;
use crate::services::storage::StorageError;

/// Errors surfaced by the HTTP handlers.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Validation error on {} field(s)", .0.len())]
    InvalidFields(FieldErrors),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Cannot move request from {from} to {to}")]
    InvalidTransition {
        from: ProcessingStatus,
        to: ProcessingStatus,
    },

    #[error("Integrity error: {0}")]
    Integrity(String),

    #[error("Multipart error: {0}")]
    Multipart(#[from] MultipartError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Queue error: {0}")]
    Queue(#[from] QueueError),

    #[error("Report error: {0}")]
    Report(ReportError),
}

impl From<ReportError> for AppError {
    fn from(err: ReportError) -> Self {
        if let ReportError::MissingProcessedImage { .. } = err {
            return AppError::Integrity(err.to_string());
        }

        match err {
            ReportError::Database(e) => AppError::Database(e),
            ReportError::Storage(e) => AppError::Storage(e),
            other => AppError::Report(other),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            AppError::InvalidFields(errors) => {
                (StatusCode::BAD_REQUEST, json!({ "errors": errors }))
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, json!({ "error": msg })),
            AppError::InvalidTransition { from, to } => (
                StatusCode::CONFLICT,
                json!({
                    "error": format!("Cannot move request from {from} to {to}"),
                    "current_status": from,
                    "requested_status": to,
                }),
            ),
            AppError::Multipart(e) => {
                tracing::warn!(error = %e, "Rejected multipart body");
                (e.status(), json!({ "error": e.body_text() }))
            }
            AppError::Integrity(msg) => {
                tracing::error!(error = %msg, "Data integrity violation");
                internal()
            }
            AppError::Database(e) => {
                tracing::error!(error = %e, "Database error");
                internal()
            }
            AppError::Storage(e) => {
                tracing::error!(error = %e, "Storage error");
                internal()
            }
            AppError::Queue(e) => {
                tracing::error!(error = %e, "Job queue error");
                internal()
            }
            AppError::Report(e) => {
                tracing::error!(error = %e, "Report generation error");
                internal()
            }
        };

        (status, Json(body)).into_response()
    }
}

fn internal() -> (StatusCode, serde_json::Value) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        json!({ "error": "Internal Server Error" }),
    )
}
