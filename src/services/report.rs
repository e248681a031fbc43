use std::time::Instant;

use sqlx::PgPool;
use uuid::Uuid;

use crate::db::{image_queries, queries};
use crate::models::request::ImageRecord;
use crate::services::storage::{self, MediaStorage, StorageError};

/// Header row of every output report.
pub const REPORT_HEADER: [&str; 4] = [
    "Serial Number",
    "Product Name",
    "Input Image Urls",
    "Output Image Urls",
];

/// Render the output report for a set of image records.
///
/// Rows are ordered by sequence id regardless of input order. Fails without
/// producing any output if a record has no processed image.
pub fn render_report(
    images: &[ImageRecord],
    storage: &MediaStorage,
) -> Result<Vec<u8>, ReportError> {
    let mut ordered: Vec<&ImageRecord> = images.iter().collect();
    ordered.sort_by_key(|img| img.sequence_id);

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(REPORT_HEADER)?;

    for img in ordered {
        let processed = img.processed_image_location.as_deref().ok_or(
            ReportError::MissingProcessedImage {
                sequence_id: img.sequence_id,
            },
        )?;

        writer.write_record([
            img.sequence_id.to_string().as_str(),
            img.product_name.as_str(),
            img.original_url.as_str(),
            storage.url(processed).as_str(),
        ])?;
    }

    writer
        .into_inner()
        .map_err(|e| ReportError::Io(e.into_error()))
}

/// Generate `outputs/{request_id}_output.csv` and record its public URL on
/// the request. Returns that URL.
///
/// The path is deterministic, so a repeated call overwrites the previous
/// report with the current image records.
pub async fn generate_output_csv(
    pool: &PgPool,
    media: &MediaStorage,
    request_id: Uuid,
) -> Result<String, ReportError> {
    let start = Instant::now();

    media.ensure_dir(storage::OUTPUT_DIR).await?;
    let path = storage::output_path(request_id);

    let images = image_queries::list_for_request(pool, request_id).await?;
    let report = render_report(&images, media)?;
    media.write(&path, &report).await?;

    let url = media.url(&path);
    queries::set_output_location(pool, request_id, &url).await?;

    metrics::counter!("output_reports_generated_total").increment(1);
    metrics::histogram!("output_report_seconds").record(start.elapsed().as_secs_f64());

    tracing::info!(
        request_id = %request_id,
        rows = images.len(),
        output = %url,
        "Output report generated"
    );

    Ok(url)
}

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("Image record {sequence_id} has no processed image location")]
    MissingProcessedImage { sequence_id: i64 },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}
