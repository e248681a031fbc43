use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::app_state::AppState;
use crate::db::queries;
use crate::error::AppError;
use crate::models::request::{ProcessingRequestResponse, ProcessingStatus};
use crate::services::queue::QueuedJob;
use crate::services::storage::{self, StorageError};

/// Name of the multipart field carrying the CSV.
const FILE_FIELD: &str = "file";

/// Extension-only check; content is never sniffed.
pub fn has_csv_extension(filename: &str) -> bool {
    std::path::Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
}

/// POST /upload/ — store a CSV and enqueue it for processing.
pub async fn upload_csv(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<ProcessingRequestResponse>), AppError> {
    let mut multipart = multipart.map_err(|e| {
        tracing::debug!(error = %e, "Upload is not a multipart body");
        AppError::Validation("missing file".to_string())
    })?;

    while let Some(mut field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        // A plain text part under `file` carries no attachment.
        let Some(filename) = field.file_name().map(str::to_string) else {
            tracing::info!("Rejected upload whose file field has no filename");
            return Err(AppError::Validation("missing file".to_string()));
        };
        if !has_csv_extension(&filename) {
            tracing::info!(filename = %filename, "Rejected upload with non-CSV filename");
            return Err(AppError::Validation("invalid format".to_string()));
        }

        let request_id = Uuid::new_v4();
        let file_path = storage::upload_path(request_id);

        state.storage.ensure_dir(storage::UPLOAD_DIR).await?;
        let mut file = state.storage.create(&file_path).await?;
        let mut size = 0usize;
        while let Some(chunk) = field.chunk().await? {
            size += chunk.len();
            file.write_all(&chunk).await.map_err(StorageError::from)?;
        }
        file.flush().await.map_err(StorageError::from)?;

        let request =
            match queries::create_request(&state.db, request_id, &file_path, &filename).await {
                Ok(request) => request,
                Err(e) => {
                    if let Err(rm_err) = state.storage.remove(&file_path).await {
                        tracing::warn!(path = %file_path, error = %rm_err, "Failed to remove orphaned upload");
                    }
                    return Err(e.into());
                }
            };

        let job = QueuedJob::new(request_id, file_path.clone());
        if let Err(e) = state.queue.enqueue(&job).await {
            tracing::error!(request_id = %request_id, error = %e, "Failed to enqueue job");
            if let Err(db_err) =
                queries::transition_status(&state.db, request_id, ProcessingStatus::Failed).await
            {
                tracing::error!(request_id = %request_id, error = %db_err, "Failed to mark request failed");
            }
            return Err(e.into());
        }

        metrics::counter!("csv_uploads_total").increment(1);
        tracing::info!(
            request_id = %request_id,
            filename = %filename,
            bytes = size,
            stored_as = %file_path,
            "CSV accepted for processing"
        );

        return Ok((StatusCode::ACCEPTED, Json((&request).into())));
    }

    Err(AppError::Validation("missing file".to_string()))
}
