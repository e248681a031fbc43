use axum::extract::rejection::PathRejection;
use axum::extract::{Path, State};
use axum::Json;
use uuid::Uuid;

use crate::app_state::AppState;
use crate::db::queries;
use crate::error::AppError;
use crate::models::request::ProcessingRequestResponse;

/// GET /status/{request_id} — current state of a processing request.
pub async fn get_status(
    State(state): State<AppState>,
    request_id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<ProcessingRequestResponse>, AppError> {
    let Path(request_id) =
        request_id.map_err(|_| AppError::Validation("request_id must be a UUID".to_string()))?;

    let request = queries::get_request(&state.db, request_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Request ID not found".to_string()))?;

    Ok(Json((&request).into()))
}
