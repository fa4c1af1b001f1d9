use match_predictor::{
    config::AppConfig,
    db::{self, store::PgPredictionStore},
    routes::metrics::describe_metrics,
    services::{sports_db::SportsDbClient, sync},
    telemetry,
};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::path::Path;
use std::time::Duration;

/// One pass of the status sync worker; schedule it with cron.
#[tokio::main]
async fn main() {
    telemetry::init_tracing();

    let config = AppConfig::from_env().expect("Failed to load configuration");

    let prometheus_handle = PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus metrics recorder");
    describe_metrics();

    let db_pool = db::init_pool(&config.database_url)
        .await
        .expect("Failed to connect to database");
    let store = PgPredictionStore::new(db_pool);

    let sports = SportsDbClient::new(
        &config.sports_api_base_url,
        &config.sports_api_key,
        Duration::from_secs(config.http_timeout_secs),
    )
    .expect("Failed to initialize sports data client");

    let result = sync::sync_pending_predictions(&store, &sports).await;

    if let Some(path) = &config.sync_metrics_file {
        if let Err(e) = telemetry::write_metrics_file(&prometheus_handle, Path::new(path)) {
            tracing::warn!(path = %path, error = %e, "Failed to write sync metrics");
        }
    }

    match result {
        Ok(summary) => {
            tracing::info!(
                won = summary.won,
                lost = summary.lost,
                unresolved = summary.unresolved,
                "{}",
                summary.message()
            );
        }
        Err(e) => {
            tracing::error!(error = %e, "Sync failed");
            std::process::exit(1);
        }
    }
}
