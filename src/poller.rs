//! Result poller.
//!
//! After a non-cached dispatch the caller polls the job every
//! [`POLL_INTERVAL`] until it leaves `processing`, giving up after
//! [`MAX_POLL_ATTEMPTS`] ticks. Only one poll session runs per [`Poller`];
//! starting a new one cancels the previous session.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::AbortHandle;
use uuid::Uuid;

use crate::client::ClientError;
use crate::models::job::{JobStatus, PredictionJob};

pub const POLL_INTERVAL: Duration = Duration::from_secs(3);
pub const MAX_POLL_ATTEMPTS: u32 = 20;

/// Anything that can report the current state of a job.
#[async_trait]
pub trait JobStatusSource: Send + Sync + 'static {
    async fn fetch_job(&self, job_id: Uuid) -> Result<PredictionJob, ClientError>;
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum PollError {
    #[error("Prediction failed: {0}")]
    Failed(String),

    #[error("Prediction not found")]
    NotFound,

    #[error("Prediction is taking longer than expected, please try again shortly")]
    Timeout,

    #[error("Polling was cancelled")]
    Cancelled,
}

/// Receives the single result of a poll session.
pub struct PollHandle {
    job_id: Uuid,
    rx: oneshot::Receiver<Result<PredictionJob, PollError>>,
}

impl PollHandle {
    pub fn job_id(&self) -> Uuid {
        self.job_id
    }

    /// Wait for the session to finish. A stopped session yields
    /// [`PollError::Cancelled`].
    pub async fn result(self) -> Result<PredictionJob, PollError> {
        self.rx.await.unwrap_or(Err(PollError::Cancelled))
    }
}

pub struct Poller {
    source: Arc<dyn JobStatusSource>,
    interval: Duration,
    max_attempts: u32,
    current: Option<AbortHandle>,
}

impl Poller {
    pub fn new(source: Arc<dyn JobStatusSource>) -> Self {
        Self::with_schedule(source, POLL_INTERVAL, MAX_POLL_ATTEMPTS)
    }

    pub fn with_schedule(source: Arc<dyn JobStatusSource>, interval: Duration, max_attempts: u32) -> Self {
        Self {
            source,
            interval,
            max_attempts,
            current: None,
        }
    }

    /// Begin polling `job_id`, cancelling any session already running.
    pub fn start(&mut self, job_id: Uuid) -> PollHandle {
        self.stop();

        let (tx, rx) = oneshot::channel();
        let source = Arc::clone(&self.source);
        let interval = self.interval;
        let max_attempts = self.max_attempts;

        let task = tokio::spawn(async move {
            let result = poll_until_settled(source.as_ref(), job_id, interval, max_attempts).await;
            // receiver may be gone if the caller lost interest
            let _ = tx.send(result);
        });

        self.current = Some(task.abort_handle());
        PollHandle { job_id, rx }
    }

    /// Cancel the running session, if any. Its handle resolves to
    /// [`PollError::Cancelled`].
    pub fn stop(&mut self) {
        if let Some(handle) = self.current.take() {
            handle.abort();
        }
    }

    pub fn is_polling(&self) -> bool {
        self.current.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn poll_until_settled(
    source: &dyn JobStatusSource,
    job_id: Uuid,
    interval: Duration,
    max_attempts: u32,
) -> Result<PredictionJob, PollError> {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    // the first tick completes immediately; checks start one interval in
    ticker.tick().await;

    for attempt in 1..=max_attempts {
        ticker.tick().await;

        match source.fetch_job(job_id).await {
            Ok(job) if job.status == JobStatus::Processing => {
                tracing::debug!(job_id = %job_id, attempt, "Prediction still processing");
            }
            Ok(job) if job.status == JobStatus::Failed => {
                let message = job
                    .error_message()
                    .unwrap_or("AI generation failed")
                    .to_string();
                return Err(PollError::Failed(message));
            }
            Ok(job) => return Ok(job),
            Err(ClientError::NotFound) => return Err(PollError::NotFound),
            Err(e) => {
                tracing::warn!(job_id = %job_id, attempt, error = %e, "Status check failed");
            }
        }
    }

    Err(PollError::Timeout)
}
