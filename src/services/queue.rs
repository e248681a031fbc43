use redis::AsyncCommands;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const QUEUE_KEY: &str = "image_csv:jobs";
const PROCESSING_KEY: &str = "image_csv:processing";

/// Job payload serialized into Redis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueuedJob {
    pub request_id: Uuid,
    /// Stored input CSV, relative to the media root.
    pub file_path: String,
    /// Zero for the first delivery, incremented on each retry.
    #[serde(default)]
    pub attempt: u32,
}

impl QueuedJob {
    pub fn new(request_id: Uuid, file_path: impl Into<String>) -> Self {
        Self {
            request_id,
            file_path: file_path.into(),
            attempt: 0,
        }
    }

    pub fn next_attempt(&self) -> Self {
        Self {
            attempt: self.attempt + 1,
            ..self.clone()
        }
    }
}

/// What happens to a dequeued job once an attempt has finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueAction {
    /// Attempt succeeded; release the job.
    Complete,
    /// Attempt failed with attempts left; re-queue it.
    Retry,
    /// Attempt failed on the last try; report failure and release the job.
    GiveUp,
}

impl QueuedJob {
    /// Decide the queue action for an attempt outcome. Any error counts,
    /// including a failed webhook delivery.
    pub fn action_after<T, E>(&self, outcome: &Result<T, E>, max_attempts: u32) -> QueueAction {
        match outcome {
            Ok(_) => QueueAction::Complete,
            Err(_) if self.attempt + 1 < max_attempts => QueueAction::Retry,
            Err(_) => QueueAction::GiveUp,
        }
    }
}

/// Redis-backed async job queue with retry support.
///
/// Jobs are pushed on the left of `QUEUE_KEY` and moved atomically into
/// `PROCESSING_KEY` when dequeued, where they stay until `complete` or
/// `retry` removes them.
pub struct JobQueue {
    client: redis::Client,
}

impl JobQueue {
    pub fn new(redis_url: &str) -> Result<Self, QueueError> {
        let client = redis::Client::open(redis_url)?;
        Ok(Self { client })
    }

    async fn connection(&self) -> Result<redis::aio::MultiplexedConnection, QueueError> {
        Ok(self.client.get_multiplexed_async_connection().await?)
    }

    /// Enqueue an image-processing job.
    pub async fn enqueue(&self, job: &QueuedJob) -> Result<(), QueueError> {
        let mut conn = self.connection().await?;
        let payload = serde_json::to_string(job)?;
        conn.lpush::<_, _, ()>(QUEUE_KEY, &payload).await?;
        Ok(())
    }

    /// Dequeue a job for processing (non-blocking pop with move to processing list).
    pub async fn dequeue(&self) -> Result<Option<QueuedJob>, QueueError> {
        let mut conn = self.connection().await?;
        let result: Option<String> = conn.rpoplpush(QUEUE_KEY, PROCESSING_KEY).await?;

        match result {
            Some(payload) => Ok(Some(serde_json::from_str(&payload)?)),
            None => Ok(None),
        }
    }

    /// Mark a job as handled (remove from processing list).
    pub async fn complete(&self, job: &QueuedJob) -> Result<(), QueueError> {
        let mut conn = self.connection().await?;
        let payload = serde_json::to_string(job)?;
        conn.lrem::<_, _, ()>(PROCESSING_KEY, 1, &payload).await?;
        Ok(())
    }

    /// Re-queue a job with its attempt counter bumped, then release the
    /// original from the processing list.
    pub async fn retry(&self, job: &QueuedJob) -> Result<QueuedJob, QueueError> {
        let next = job.next_attempt();
        self.enqueue(&next).await?;
        self.complete(job).await?;
        Ok(next)
    }

    /// Check Redis connectivity (for health checks).
    pub async fn health_check(&self) -> Result<(), QueueError> {
        let mut conn = self.connection().await?;
        redis::cmd("PING").query_async::<String>(&mut conn).await?;
        Ok(())
    }

    /// Get the current queue depth (jobs not yet picked up).
    pub async fn queue_depth(&self) -> Result<u64, QueueError> {
        let mut conn = self.connection().await?;
        let depth: u64 = conn.llen(QUEUE_KEY).await?;
        Ok(depth)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}
