use match_predictor::{
    config::AppConfig,
    db::{self, store::PgPredictionStore},
    services::{
        gemini::GeminiClient,
        generation::{self, GenerationOutcome},
        queue::JobQueue,
    },
    telemetry,
};
use std::time::Duration;
use tokio::time::sleep;

const POLL_INTERVAL_MS: u64 = 1000; // 1 second

struct Worker {
    store: PgPredictionStore,
    queue: JobQueue,
    model: GeminiClient,
}

#[tokio::main]
async fn main() {
    telemetry::init_tracing();

    tracing::info!("Starting prediction generation worker");

    let config = AppConfig::from_env().expect("Failed to load configuration");

    let metrics_addr = telemetry::install_metrics_listener(&config.worker_metrics_addr)
        .expect("Failed to install Prometheus metrics exporter");
    tracing::info!(addr = %metrics_addr, "Serving worker metrics");

    tracing::info!("Connecting to PostgreSQL");
    let db_pool = db::init_pool(&config.database_url)
        .await
        .expect("Failed to connect to database");

    let queue = JobQueue::new(&config.redis_url).expect("Failed to initialize job queue");

    let model = GeminiClient::new(&config.gemini_base_url, &config.gemini_model, &config.gemini_api_key)
        .expect("Failed to initialize Gemini client");

    let worker = Worker {
        store: PgPredictionStore::new(db_pool),
        queue,
        model,
    };

    tracing::info!(model = %config.gemini_model, "Worker ready, starting job processing loop");

    loop {
        match process_next_job(&worker).await {
            Ok(true) => {
                tracing::debug!("Job processed, checking for next job");
            }
            Ok(false) => {
                tracing::trace!("No jobs available, sleeping");
                sleep(Duration::from_millis(POLL_INTERVAL_MS)).await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Queue error, will retry");
                sleep(Duration::from_millis(POLL_INTERVAL_MS)).await;
            }
        }
    }
}

/// Generate the next queued prediction.
/// Returns Ok(true) if a job was taken, Ok(false) if the queue was empty.
///
/// Every job gets exactly one attempt; failures are recorded on the job row
/// by [`generation::generate`] and the entry is removed from the queue.
async fn process_next_job(worker: &Worker) -> Result<bool, Box<dyn std::error::Error>> {
    if let Ok(depth) = worker.queue.queue_depth().await {
        metrics::gauge!("prediction_queue_depth").set(depth as f64);
    }

    let job = match worker.queue.dequeue().await? {
        Some(j) => j,
        None => return Ok(false),
    };

    tracing::info!(
        job_id = %job.job_id,
        team_a = %job.team_a,
        team_b = %job.team_b,
        category = %job.category,
        "Generating prediction"
    );

    match generation::generate(&worker.store, &worker.model, &job).await {
        GenerationOutcome::Completed => {}
        GenerationOutcome::Failed(message) => {
            tracing::warn!(job_id = %job.job_id, error = %message, "Job marked failed");
        }
        GenerationOutcome::Skipped => {
            tracing::info!(job_id = %job.job_id, "Job already settled elsewhere");
        }
        GenerationOutcome::Stuck(message) => {
            tracing::error!(job_id = %job.job_id, error = %message, "Job left processing");
        }
    }

    worker.queue.complete(&job).await?;

    Ok(true)
}
