use axum::extract::State;
use axum::response::IntoResponse;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;

/// Register descriptions for every metric the service emits.
pub fn describe_metrics() {
    metrics::describe_counter!("csv_uploads_total", "CSV files accepted for processing");
    metrics::describe_counter!(
        "webhook_events_total",
        "Status notifications applied, labelled by status"
    );
    metrics::describe_counter!(
        "webhook_rejections_total",
        "Status notifications rejected, labelled by reason"
    );
    metrics::describe_counter!(
        "output_reports_generated_total",
        "Output CSV reports written"
    );
    metrics::describe_gauge!(
        "job_queue_depth",
        "Jobs waiting in the queue, sampled on each health check"
    );
    metrics::describe_histogram!(
        "output_report_seconds",
        "Time to build and store an output CSV report"
    );
}

/// Prometheus metrics scrape endpoint.
pub async fn prometheus_metrics(State(handle): State<Arc<PrometheusHandle>>) -> impl IntoResponse {
    handle.render()
}
