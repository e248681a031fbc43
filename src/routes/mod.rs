use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::app_state::AppState;

pub mod health;
pub mod metrics;
pub mod status;
pub mod upload;
pub mod webhook;

/// Build the full HTTP surface: API routes, health, metrics and media files.
pub fn create_router(
    state: AppState,
    prometheus: Arc<PrometheusHandle>,
    max_upload_bytes: usize,
) -> Router {
    let media = ServeDir::new(state.storage.root());

    Router::new()
        .route("/health", get(health::health_check))
        .route("/upload/", post(upload::upload_csv))
        .route("/status/{request_id}", get(status::get_status))
        .route("/status/{request_id}/", get(status::get_status))
        .route(
            "/webhook/processing_complete/",
            post(webhook::processing_complete),
        )
        .with_state(state)
        // Prometheus metrics endpoint (separate state)
        .route(
            "/metrics",
            get(metrics::prometheus_metrics).with_state(prometheus),
        )
        .nest_service("/media", media)
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(RequestBodyLimitLayer::new(max_upload_bytes))
}
