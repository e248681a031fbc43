use axum::body::Bytes;
use axum::extract::State;
use axum::Json;

use crate::app_state::AppState;
use crate::db::queries::{self, Transition};
use crate::error::AppError;
use crate::models::request::ProcessingStatus;
use crate::models::webhook::{FieldErrors, WebhookAck, WebhookPayload};
use crate::services::report;

/// POST /webhook/processing_complete/ — status notification from the worker.
///
/// Applies the status through the transition table and, for `completed`,
/// writes the output report before acknowledging.
pub async fn processing_complete(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<WebhookAck>, AppError> {
    let payload: WebhookPayload = serde_json::from_slice(&body).map_err(|e| {
        metrics::counter!("webhook_rejections_total", "reason" => "malformed").increment(1);
        AppError::InvalidFields(FieldErrors::from([("body".to_string(), vec![e.to_string()])]))
    })?;

    let event = payload.into_event().map_err(|errors| {
        metrics::counter!("webhook_rejections_total", "reason" => "schema").increment(1);
        AppError::InvalidFields(errors)
    })?;

    let request = match queries::transition_status(&state.db, event.request_id, event.status).await? {
        Transition::Applied(request) => request,
        Transition::NotFound => {
            metrics::counter!("webhook_rejections_total", "reason" => "unknown_request")
                .increment(1);
            return Err(AppError::NotFound("Request ID not found".to_string()));
        }
        Transition::Rejected { current } => {
            metrics::counter!("webhook_rejections_total", "reason" => "transition").increment(1);
            tracing::warn!(
                request_id = %event.request_id,
                current = %current,
                requested = %event.status,
                "Rejected status transition"
            );
            return Err(AppError::InvalidTransition {
                from: current,
                to: event.status,
            });
        }
    };

    metrics::counter!("webhook_events_total", "status" => request.status.as_str()).increment(1);
    tracing::info!(
        request_id = %request.request_id,
        status = %request.status,
        "Processing status updated"
    );

    if request.status == ProcessingStatus::Completed {
        report::generate_output_csv(&state.db, &state.storage, request.request_id).await?;
    }

    Ok(Json(WebhookAck::received()))
}
