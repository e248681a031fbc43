use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::models::request::{ProcessingRequest, ProcessingStatus};

const REQUEST_COLUMNS: &str = "request_id, status, input_file_path, original_filename, \
                               output_file_location, created_at, updated_at";

/// Outcome of a guarded status update.
#[derive(Debug)]
pub enum Transition {
    Applied(ProcessingRequest),
    /// The request exists but its current status may not move to the target.
    Rejected { current: ProcessingStatus },
    NotFound,
}

fn request_from_row(row: &PgRow) -> Result<ProcessingRequest, sqlx::Error> {
    let status: String = row.try_get("status")?;
    let status = status
        .parse::<ProcessingStatus>()
        .map_err(|e| sqlx::Error::Decode(Box::new(e)))?;

    Ok(ProcessingRequest {
        request_id: row.try_get("request_id")?,
        status,
        input_file_path: row.try_get("input_file_path")?,
        original_filename: row.try_get("original_filename")?,
        output_file_location: row.try_get("output_file_location")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

/// Insert a new processing request in `pending` status.
pub async fn create_request(
    pool: &PgPool,
    request_id: Uuid,
    input_file_path: &str,
    original_filename: &str,
) -> Result<ProcessingRequest, sqlx::Error> {
    let row = sqlx::query(&format!(
        r#"
        INSERT INTO processing_requests (request_id, status, input_file_path, original_filename)
        VALUES ($1, 'pending', $2, $3)
        RETURNING {REQUEST_COLUMNS}
        "#
    ))
    .bind(request_id)
    .bind(input_file_path)
    .bind(original_filename)
    .fetch_one(pool)
    .await?;

    request_from_row(&row)
}

/// Get a processing request by ID
pub async fn get_request(
    pool: &PgPool,
    request_id: Uuid,
) -> Result<Option<ProcessingRequest>, sqlx::Error> {
    let row = sqlx::query(&format!(
        "SELECT {REQUEST_COLUMNS} FROM processing_requests WHERE request_id = $1"
    ))
    .bind(request_id)
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(request_from_row).transpose()
}

/// Move a request to `next` if its current status allows it.
///
/// The guard lives in the `WHERE` clause so two concurrent deliveries cannot
/// both move the row out of the same state.
pub async fn transition_status(
    pool: &PgPool,
    request_id: Uuid,
    next: ProcessingStatus,
) -> Result<Transition, sqlx::Error> {
    let allowed_from: Vec<String> = next
        .predecessors()
        .into_iter()
        .map(|s| s.as_str().to_string())
        .collect();

    let row = sqlx::query(&format!(
        r#"
        UPDATE processing_requests
        SET status = $1,
            updated_at = NOW()
        WHERE request_id = $2
          AND status = ANY($3)
        RETURNING {REQUEST_COLUMNS}
        "#
    ))
    .bind(next.as_str())
    .bind(request_id)
    .bind(allowed_from)
    .fetch_optional(pool)
    .await?;

    if let Some(row) = row {
        return Ok(Transition::Applied(request_from_row(&row)?));
    }

    Ok(match get_request(pool, request_id).await? {
        Some(current) => Transition::Rejected {
            current: current.status,
        },
        None => Transition::NotFound,
    })
}

/// Record the public URL of the generated output report.
pub async fn set_output_location(
    pool: &PgPool,
    request_id: Uuid,
    location: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE processing_requests
        SET output_file_location = $1,
            updated_at = NOW()
        WHERE request_id = $2
        "#,
    )
    .bind(location)
    .bind(request_id)
    .execute(pool)
    .await?;

    Ok(())
}
