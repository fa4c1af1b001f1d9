//! Job dispatch: reuse a recent job for the fixture or create one and hand it
//! to the generation worker.

use chrono::{Duration, Utc};

use crate::db::store::{AttachOutcome, PredictionStore, StoreError};
use crate::models::job::{Category, JobStatus, PredictionJob};
use crate::services::queue::{GenerationQueue, QueueError, QueuedGeneration};
use crate::services::team_names::normalize_team_name;

/// Requests for the same fixture inside this window attach to one job.
pub const REUSE_WINDOW_HOURS: i64 = 24;

/// What the caller should do next.
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch {
    /// A prediction already exists; `result_payload.fromCache` is set.
    Cached(PredictionJob),
    /// Generation is in flight; poll this job.
    InFlight(PredictionJob),
}

impl Dispatch {
    pub fn job(&self) -> &PredictionJob {
        match self {
            Dispatch::Cached(job) | Dispatch::InFlight(job) => job,
        }
    }

    pub fn is_cached(&self) -> bool {
        matches!(self, Dispatch::Cached(_))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Could not queue generation: {0}")]
    Queue(#[from] QueueError),
}

/// Find or create the prediction job for `team_a` vs `team_b`.
///
/// With `force_refresh` the reuse window is skipped and a new job is always
/// created.
pub async fn request_job(
    store: &dyn PredictionStore,
    queue: &dyn GenerationQueue,
    team_a: &str,
    team_b: &str,
    category: Category,
    force_refresh: bool,
) -> Result<Dispatch, DispatchError> {
    let team_a = normalize_team_name(team_a);
    let team_b = normalize_team_name(team_b);

    if team_a.is_empty() || team_b.is_empty() {
        return Err(DispatchError::Validation("team names must not be empty".to_string()));
    }
    if team_a.eq_ignore_ascii_case(&team_b) {
        return Err(DispatchError::Validation(format!(
            "a team cannot play itself ({})",
            team_a
        )));
    }

    metrics::counter!("predictions_requested_total").increment(1);

    let candidate = PredictionJob::new_processing(team_a, team_b, category);
    let outcome = if force_refresh {
        AttachOutcome::Created(store.insert(candidate).await?)
    } else {
        let since = Utc::now() - Duration::hours(REUSE_WINDOW_HOURS);
        store.attach_or_create(candidate, since).await?
    };

    match outcome {
        AttachOutcome::Attached(mut job) if job.status.has_prediction() => {
            tracing::info!(job_id = %job.id, tally = job.tally, status = %job.status, "Serving cached prediction");
            metrics::counter!("predictions_cache_hits_total").increment(1);
            if let Some(payload) = job.result_payload.as_object_mut() {
                payload.insert("fromCache".to_string(), serde_json::Value::Bool(true));
            }
            Ok(Dispatch::Cached(job))
        }
        AttachOutcome::Attached(job) => {
            tracing::info!(job_id = %job.id, tally = job.tally, "Attached to in-flight prediction");
            Ok(Dispatch::InFlight(job))
        }
        AttachOutcome::Created(job) => {
            tracing::info!(
                job_id = %job.id,
                team_a = %job.team_a,
                team_b = %job.team_b,
                category = %job.category,
                "Created prediction job"
            );

            let queued = QueuedGeneration {
                job_id: job.id,
                team_a: job.team_a.clone(),
                team_b: job.team_b.clone(),
                category: job.category,
            };

            if let Err(e) = queue.enqueue(&queued).await {
                tracing::error!(job_id = %job.id, error = %e, "Failed to queue generation");
                if let Err(store_err) = store.fail(job.id, &format!("Could not queue generation: {e}")).await {
                    tracing::error!(job_id = %job.id, error = %store_err, "Failed to mark unqueued job as failed");
                }
                return Err(e.into());
            }

            debug_assert_eq!(job.status, JobStatus::Processing);
            Ok(Dispatch::InFlight(job))
        }
    }
}
