use image_csv_processor::{
    config::AppConfig,
    db::{self, image_queries},
    models::request::ProcessingStatus,
    services::{
        input_csv,
        notifier::WebhookNotifier,
        processor::ImageProcessor,
        queue::{JobQueue, QueueAction, QueuedJob},
        storage::{self, MediaStorage},
    },
};
use sqlx::PgPool;
use std::time::Duration;
use tokio::time::sleep;
use tracing_subscriber::EnvFilter;

const MAX_ATTEMPTS: u32 = 3;
const POLL_INTERVAL_MS: u64 = 1000; // 1 second

struct Worker {
    db: PgPool,
    storage: MediaStorage,
    queue: JobQueue,
    processor: ImageProcessor,
    notifier: WebhookNotifier,
}

#[tokio::main]
async fn main() {
    // Initialize structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    tracing::info!("Starting image processing worker");

    let config = AppConfig::from_env().expect("Failed to load configuration");

    tracing::info!("Connecting to PostgreSQL");
    let db_pool = db::init_pool(&config.database_url)
        .await
        .expect("Failed to connect to database");

    tracing::info!("Initializing services");
    let worker = Worker {
        db: db_pool,
        storage: MediaStorage::new(&config.media_root, &config.media_url)
            .expect("Failed to initialize media storage"),
        queue: JobQueue::new(&config.redis_url).expect("Failed to initialize job queue"),
        processor: ImageProcessor::new(config.jpeg_quality)
            .expect("Failed to initialize image processor"),
        notifier: WebhookNotifier::new(&config.webhook_url)
            .expect("Failed to initialize webhook client"),
    };

    tracing::info!(
        webhook = %config.webhook_url,
        quality = worker.processor.quality(),
        "Worker ready, starting job processing loop"
    );

    loop {
        match process_next_job(&worker).await {
            Ok(true) => {
                tracing::debug!("Job handled, checking for next job");
            }
            Ok(false) => {
                tracing::trace!("No jobs available, sleeping");
                sleep(Duration::from_millis(POLL_INTERVAL_MS)).await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Error handling job, will retry");
                sleep(Duration::from_millis(POLL_INTERVAL_MS)).await;
            }
        }
    }
}

/// Handle the next job from the queue.
/// Returns Ok(true) if a job was handled, Ok(false) if none was available.
///
/// Every dequeued job leaves the processing list through `complete` or
/// `retry`, whatever the attempt outcome.
async fn process_next_job(worker: &Worker) -> Result<bool, Box<dyn std::error::Error>> {
    let job = match worker.queue.dequeue().await? {
        Some(j) => j,
        None => return Ok(false),
    };

    tracing::info!(
        request_id = %job.request_id,
        file_path = %job.file_path,
        attempt = job.attempt,
        "Processing CSV job"
    );

    let outcome = run_attempt(worker, &job).await;

    match (job.action_after(&outcome, MAX_ATTEMPTS), outcome) {
        (QueueAction::Complete, Ok(images)) => {
            worker.queue.complete(&job).await?;
            tracing::info!(request_id = %job.request_id, images, "Job completed successfully");
        }
        (QueueAction::Retry, outcome) => {
            let next = worker.queue.retry(&job).await?;
            tracing::warn!(
                request_id = %job.request_id,
                attempt = next.attempt,
                error = %describe(&outcome),
                "Job failed, re-queued for retry"
            );
        }
        (_, outcome) => {
            tracing::error!(
                request_id = %job.request_id,
                attempts = MAX_ATTEMPTS,
                error = %describe(&outcome),
                "Job failed after max attempts"
            );
            if let Err(e) = worker
                .notifier
                .notify(job.request_id, ProcessingStatus::Failed)
                .await
            {
                tracing::error!(request_id = %job.request_id, error = %e, "Could not report job failure");
            }
            worker.queue.complete(&job).await?;
        }
    }

    Ok(true)
}

fn describe<T>(outcome: &Result<T, Box<dyn std::error::Error>>) -> String {
    match outcome {
        Ok(_) => "none".to_string(),
        Err(e) => e.to_string(),
    }
}

/// One attempt: report `processing` on first delivery, process every image,
/// then report `completed`. A failed webhook delivery fails the attempt.
async fn run_attempt(
    worker: &Worker,
    job: &QueuedJob,
) -> Result<usize, Box<dyn std::error::Error>> {
    if job.attempt == 0 {
        worker
            .notifier
            .notify(job.request_id, ProcessingStatus::Processing)
            .await?;
    }

    let images = process_job_inner(worker, job).await?;

    worker
        .notifier
        .notify(job.request_id, ProcessingStatus::Completed)
        .await?;

    Ok(images)
}

/// Parse the input CSV, then download, re-encode and store every image.
/// Returns the number of images processed.
async fn process_job_inner(
    worker: &Worker,
    job: &QueuedJob,
) -> Result<usize, Box<dyn std::error::Error>> {
    let removed = image_queries::delete_for_request(&worker.db, job.request_id).await?;
    if removed > 0 {
        tracing::debug!(request_id = %job.request_id, removed, "Cleared records from earlier attempt");
    }

    let data = worker.storage.read(&job.file_path).await?;
    let entries = input_csv::parse_input_csv(&data)?;

    tracing::info!(request_id = %job.request_id, images = entries.len(), "Input CSV parsed");

    for entry in &entries {
        let record = image_queries::insert_image(
            &worker.db,
            job.request_id,
            &entry.product_name,
            &entry.url,
        )
        .await?;

        let start = std::time::Instant::now();
        let jpeg = worker.processor.process(&entry.url).await?;
        let path = storage::processed_image_path(job.request_id, record.sequence_id);
        worker.storage.write(&path, &jpeg).await?;
        image_queries::set_processed_location(&worker.db, record.sequence_id, &path).await?;

        tracing::debug!(
            request_id = %job.request_id,
            sequence_id = record.sequence_id,
            bytes = jpeg.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Image processed"
        );
    }

    Ok(entries.len())
}
