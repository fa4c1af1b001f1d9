//! Storage seam for prediction jobs.
//!
//! Workers and routes only talk to [`PredictionStore`]. Production uses the
//! Postgres implementation; tests and local runs can use the in-memory one.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use uuid::Uuid;

use crate::db::queries;
use crate::models::api::PredictionStats;
use crate::models::job::{Category, JobStatus, PredictionJob};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Result of looking up a fixture inside the reuse window.
#[derive(Debug, Clone, PartialEq)]
pub enum AttachOutcome {
    /// No reusable job existed; this one was inserted.
    Created(PredictionJob),
    /// An existing job was found and its tally incremented.
    Attached(PredictionJob),
}

#[async_trait]
pub trait PredictionStore: Send + Sync {
    /// Atomically attach to the newest job for the fixture created after
    /// `since`, or insert `candidate` when there is none or it failed.
    async fn attach_or_create(
        &self,
        candidate: PredictionJob,
        since: DateTime<Utc>,
    ) -> Result<AttachOutcome, StoreError>;

    /// Insert unconditionally (forced refresh).
    async fn insert(&self, job: PredictionJob) -> Result<PredictionJob, StoreError>;

    async fn get(&self, job_id: Uuid) -> Result<Option<PredictionJob>, StoreError>;

    /// `processing -> pending` with the prediction payload. `false` if the job
    /// was not `processing`.
    async fn complete_generation(
        &self,
        job_id: Uuid,
        payload: serde_json::Value,
    ) -> Result<bool, StoreError>;

    /// `processing -> failed` with `{"error": message}`.
    async fn fail(&self, job_id: Uuid, message: &str) -> Result<bool, StoreError>;

    /// `pending -> won|lost`, backfilling logos when given.
    async fn resolve(
        &self,
        job_id: Uuid,
        status: JobStatus,
        team_a_logo: Option<String>,
        team_b_logo: Option<String>,
    ) -> Result<bool, StoreError>;

    async fn pending_since(&self, since: DateTime<Utc>) -> Result<Vec<PredictionJob>, StoreError>;

    async fn list_recent(&self, limit: i64) -> Result<Vec<PredictionJob>, StoreError>;

    async fn stats(&self) -> Result<PredictionStats, StoreError>;

    /// Connectivity check for `/health`.
    async fn ping(&self) -> Result<(), StoreError>;
}

/// PostgreSQL-backed store.
pub struct PgPredictionStore {
    pool: PgPool,
}

impl PgPredictionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PredictionStore for PgPredictionStore {
    async fn attach_or_create(
        &self,
        candidate: PredictionJob,
        since: DateTime<Utc>,
    ) -> Result<AttachOutcome, StoreError> {
        let (job, created) = queries::attach_or_create(&self.pool, &candidate, since).await?;
        Ok(if created {
            AttachOutcome::Created(job)
        } else {
            AttachOutcome::Attached(job)
        })
    }

    async fn insert(&self, job: PredictionJob) -> Result<PredictionJob, StoreError> {
        Ok(queries::insert_job(&self.pool, &job).await?)
    }

    async fn get(&self, job_id: Uuid) -> Result<Option<PredictionJob>, StoreError> {
        Ok(queries::get_job(&self.pool, job_id).await?)
    }

    async fn complete_generation(
        &self,
        job_id: Uuid,
        payload: serde_json::Value,
    ) -> Result<bool, StoreError> {
        Ok(queries::complete_generation(&self.pool, job_id, &payload).await?)
    }

    async fn fail(&self, job_id: Uuid, message: &str) -> Result<bool, StoreError> {
        Ok(queries::fail_job(&self.pool, job_id, message).await?)
    }

    async fn resolve(
        &self,
        job_id: Uuid,
        status: JobStatus,
        team_a_logo: Option<String>,
        team_b_logo: Option<String>,
    ) -> Result<bool, StoreError> {
        Ok(queries::resolve_job(
            &self.pool,
            job_id,
            status,
            team_a_logo.as_deref(),
            team_b_logo.as_deref(),
        )
        .await?)
    }

    async fn pending_since(&self, since: DateTime<Utc>) -> Result<Vec<PredictionJob>, StoreError> {
        Ok(queries::get_pending_since(&self.pool, since).await?)
    }

    async fn list_recent(&self, limit: i64) -> Result<Vec<PredictionJob>, StoreError> {
        Ok(queries::list_recent(&self.pool, limit).await?)
    }

    async fn stats(&self) -> Result<PredictionStats, StoreError> {
        Ok(queries::status_counts(&self.pool).await?)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// In-process store with the same transition rules as the Postgres one.
#[derive(Default)]
pub struct MemoryPredictionStore {
    jobs: Mutex<Vec<PredictionJob>>,
    failing_writes: AtomicUsize,
}

impl MemoryPredictionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `n` write operations fail with [`StoreError::Unavailable`].
    pub fn fail_next_writes(&self, n: usize) {
        self.failing_writes.store(n, Ordering::SeqCst);
    }

    /// Insert a job as-is, bypassing the dispatcher. Useful for seeding.
    pub fn seed(&self, job: PredictionJob) {
        self.lock().push(job);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<PredictionJob>> {
        self.jobs.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn check_write(&self) -> Result<(), StoreError> {
        let failed = self
            .failing_writes
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failed {
            return Err(StoreError::Unavailable("injected write failure".to_string()));
        }
        Ok(())
    }

    fn transition(
        &self,
        job_id: Uuid,
        to: JobStatus,
        apply: impl FnOnce(&mut PredictionJob),
    ) -> Result<bool, StoreError> {
        self.check_write()?;
        let mut jobs = self.lock();
        match jobs.iter_mut().find(|j| j.id == job_id) {
            Some(job) if job.status.can_transition_to(to) => {
                job.status = to;
                apply(job);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

fn newest_fixture<'a>(
    jobs: &'a mut [PredictionJob],
    team_a: &str,
    team_b: &str,
    category: Category,
    since: DateTime<Utc>,
) -> Option<&'a mut PredictionJob> {
    jobs.iter_mut()
        .filter(|j| j.created_at >= since && j.is_fixture(team_a, team_b, category))
        .max_by_key(|j| j.created_at)
}

#[async_trait]
impl PredictionStore for MemoryPredictionStore {
    async fn attach_or_create(
        &self,
        candidate: PredictionJob,
        since: DateTime<Utc>,
    ) -> Result<AttachOutcome, StoreError> {
        self.check_write()?;
        let mut jobs = self.lock();
        let existing = newest_fixture(
            &mut jobs,
            &candidate.team_a,
            &candidate.team_b,
            candidate.category,
            since,
        );
        if let Some(job) = existing {
            if job.status != JobStatus::Failed {
                job.tally += 1;
                return Ok(AttachOutcome::Attached(job.clone()));
            }
        }
        jobs.push(candidate.clone());
        Ok(AttachOutcome::Created(candidate))
    }

    async fn insert(&self, job: PredictionJob) -> Result<PredictionJob, StoreError> {
        self.check_write()?;
        self.lock().push(job.clone());
        Ok(job)
    }

    async fn get(&self, job_id: Uuid) -> Result<Option<PredictionJob>, StoreError> {
        Ok(self.lock().iter().find(|j| j.id == job_id).cloned())
    }

    async fn complete_generation(
        &self,
        job_id: Uuid,
        payload: serde_json::Value,
    ) -> Result<bool, StoreError> {
        self.transition(job_id, JobStatus::Pending, |job| job.result_payload = payload)
    }

    async fn fail(&self, job_id: Uuid, message: &str) -> Result<bool, StoreError> {
        self.transition(job_id, JobStatus::Failed, |job| {
            job.result_payload = serde_json::json!({ "error": message });
        })
    }

    async fn resolve(
        &self,
        job_id: Uuid,
        status: JobStatus,
        team_a_logo: Option<String>,
        team_b_logo: Option<String>,
    ) -> Result<bool, StoreError> {
        self.transition(job_id, status, |job| {
            if team_a_logo.is_some() {
                job.team_a_logo = team_a_logo;
            }
            if team_b_logo.is_some() {
                job.team_b_logo = team_b_logo;
            }
        })
    }

    async fn pending_since(&self, since: DateTime<Utc>) -> Result<Vec<PredictionJob>, StoreError> {
        let mut pending: Vec<_> = self
            .lock()
            .iter()
            .filter(|j| j.status == JobStatus::Pending && j.created_at >= since)
            .cloned()
            .collect();
        pending.sort_by_key(|j| j.created_at);
        Ok(pending)
    }

    async fn list_recent(&self, limit: i64) -> Result<Vec<PredictionJob>, StoreError> {
        let mut jobs = self.lock().clone();
        jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        jobs.truncate(limit.max(0) as usize);
        Ok(jobs)
    }

    async fn stats(&self) -> Result<PredictionStats, StoreError> {
        let mut stats = PredictionStats::default();
        for job in self.lock().iter() {
            stats.total += 1;
            match job.status {
                JobStatus::Processing => stats.processing += 1,
                JobStatus::Pending => stats.pending += 1,
                JobStatus::Won => stats.won += 1,
                JobStatus::Lost => stats.lost += 1,
                JobStatus::Failed => stats.failed += 1,
            }
        }
        Ok(stats.with_accuracy())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
