use axum::extract::State;
use axum::response::IntoResponse;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;

/// Prometheus scrape endpoint for the prediction counters and generation
/// latency histogram.
pub async fn prometheus_metrics(State(handle): State<Arc<PrometheusHandle>>) -> impl IntoResponse {
    handle.render()
}

/// Register descriptions for every metric the service emits.
pub fn describe_metrics() {
    metrics::describe_counter!(
        "predictions_requested_total",
        "Prediction requests accepted by the dispatcher"
    );
    metrics::describe_counter!(
        "predictions_cache_hits_total",
        "Requests answered with an existing prediction"
    );
    metrics::describe_counter!(
        "predictions_generated_total",
        "Predictions successfully generated by the worker"
    );
    metrics::describe_counter!(
        "predictions_failed_total",
        "Prediction generations that failed"
    );
    metrics::describe_counter!(
        "predictions_resolved_total",
        "Predictions settled against real results, by outcome"
    );
    metrics::describe_histogram!(
        "prediction_generation_seconds",
        "Time to generate one prediction"
    );
    metrics::describe_gauge!(
        "prediction_queue_depth",
        "Generation jobs waiting in the queue"
    );
}
