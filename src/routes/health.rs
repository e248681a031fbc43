use std::time::Instant;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use crate::app_state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub checks: HealthChecks,
    /// Jobs waiting in the queue; absent when Redis is unreachable.
    pub queue_depth: Option<u64>,
}

#[derive(Serialize)]
pub struct HealthChecks {
    pub database: ComponentHealth,
    pub queue: ComponentHealth,
}

#[derive(Serialize)]
pub struct ComponentHealth {
    pub status: &'static str,
    pub latency_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ComponentHealth {
    fn from_probe<E: std::fmt::Display>(result: Result<(), E>, started: Instant) -> Self {
        match result {
            Ok(()) => Self {
                status: "ok",
                latency_ms: Some(started.elapsed().as_millis() as u64),
                detail: None,
            },
            Err(e) => Self {
                status: "error",
                latency_ms: None,
                detail: Some(e.to_string()),
            },
        }
    }

    fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}

/// GET /health — database and job queue reachability, plus queue depth.
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let started = Instant::now();
    let db = sqlx::query("SELECT 1").execute(&state.db).await.map(|_| ());
    let database = ComponentHealth::from_probe(db, started);

    let started = Instant::now();
    let queue = ComponentHealth::from_probe(state.queue.health_check().await, started);

    let queue_depth = if queue.is_ok() {
        match state.queue.queue_depth().await {
            Ok(depth) => {
                metrics::gauge!("job_queue_depth").set(depth as f64);
                Some(depth)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read queue depth");
                None
            }
        }
    } else {
        None
    };

    let healthy = database.is_ok() && queue.is_ok();
    if !healthy {
        tracing::warn!(
            database = database.status,
            queue = queue.status,
            "Health check degraded"
        );
    }

    let code = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        code,
        Json(HealthResponse {
            status: if healthy { "ok" } else { "degraded" },
            version: env!("CARGO_PKG_VERSION"),
            checks: HealthChecks { database, queue },
            queue_depth,
        }),
    )
}
