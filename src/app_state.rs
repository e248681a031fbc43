use sqlx::PgPool;
use std::sync::Arc;

use crate::services::{queue::JobQueue, storage::MediaStorage};

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub storage: Arc<MediaStorage>,
    pub queue: Arc<JobQueue>,
}

impl AppState {
    pub fn new(db: PgPool, storage: MediaStorage, queue: JobQueue) -> Self {
        Self {
            db,
            storage: Arc::new(storage),
            queue: Arc::new(queue),
        }
    }
}
