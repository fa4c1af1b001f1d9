use async_trait::async_trait;
use redis::AsyncCommands;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::job::Category;

const QUEUE_KEY: &str = "match_predictor:generation";
const PROCESSING_KEY: &str = "match_predictor:generation:processing";

/// Generation request handed from the dispatcher to the worker.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueuedGeneration {
    pub job_id: Uuid,
    pub team_a: String,
    pub team_b: String,
    pub category: Category,
}

/// Producer side of the fire-and-forget handoff.
#[async_trait]
pub trait GenerationQueue: Send + Sync {
    async fn enqueue(&self, job: &QueuedGeneration) -> Result<(), QueueError>;

    /// Connectivity check for `/health`.
    async fn health_check(&self) -> Result<(), QueueError>;
}

/// Redis-backed generation queue.
pub struct JobQueue {
    client: redis::Client,
}

impl JobQueue {
    pub fn new(redis_url: &str) -> Result<Self, QueueError> {
        let client = redis::Client::open(redis_url).map_err(QueueError::Redis)?;
        Ok(Self { client })
    }

    /// Take the next job, parking it in the processing list until
    /// [`JobQueue::complete`] is called.
    pub async fn dequeue(&self) -> Result<Option<QueuedGeneration>, QueueError> {
        let mut conn = self.client.get_multiplexed_async_connection().await.map_err(QueueError::Redis)?;
        let result: Option<String> = conn
            .rpoplpush(QUEUE_KEY, PROCESSING_KEY)
            .await
            .map_err(QueueError::Redis)?;

        match result {
            Some(payload) => {
                let job: QueuedGeneration = serde_json::from_str(&payload).map_err(QueueError::Serialize)?;
                Ok(Some(job))
            }
            None => Ok(None),
        }
    }

    /// Remove a finished job from the processing list.
    pub async fn complete(&self, job: &QueuedGeneration) -> Result<(), QueueError> {
        let mut conn = self.client.get_multiplexed_async_connection().await.map_err(QueueError::Redis)?;
        let payload = serde_json::to_string(job).map_err(QueueError::Serialize)?;
        conn.lrem::<_, _, ()>(PROCESSING_KEY, 1, &payload)
            .await
            .map_err(QueueError::Redis)?;
        Ok(())
    }

    /// Number of jobs waiting for a worker.
    pub async fn queue_depth(&self) -> Result<u64, QueueError> {
        let mut conn = self.client.get_multiplexed_async_connection().await.map_err(QueueError::Redis)?;
        let depth: u64 = conn.llen(QUEUE_KEY).await.map_err(QueueError::Redis)?;
        Ok(depth)
    }
}

#[async_trait]
impl GenerationQueue for JobQueue {
    async fn enqueue(&self, job: &QueuedGeneration) -> Result<(), QueueError> {
        let mut conn = self.client.get_multiplexed_async_connection().await.map_err(QueueError::Redis)?;
        let payload = serde_json::to_string(job).map_err(QueueError::Serialize)?;
        conn.lpush::<_, _, ()>(QUEUE_KEY, &payload)
            .await
            .map_err(QueueError::Redis)?;
        Ok(())
    }

    async fn health_check(&self) -> Result<(), QueueError> {
        let mut conn = self.client.get_multiplexed_async_connection().await.map_err(QueueError::Redis)?;
        redis::cmd("PING")
            .query_async::<String>(&mut conn)
            .await
            .map_err(QueueError::Redis)?;
        Ok(())
    }
}

/// Queue that records what was enqueued instead of sending it anywhere.
#[derive(Default)]
pub struct RecordingQueue {
    jobs: std::sync::Mutex<Vec<QueuedGeneration>>,
    fail: std::sync::atomic::AtomicBool,
}

impl RecordingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent enqueue fail.
    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, std::sync::atomic::Ordering::SeqCst);
    }

    pub fn enqueued(&self) -> Vec<QueuedGeneration> {
        self.jobs.lock().map(|j| j.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl GenerationQueue for RecordingQueue {
    async fn enqueue(&self, job: &QueuedGeneration) -> Result<(), QueueError> {
        if self.fail.load(std::sync::atomic::Ordering::SeqCst) {
            return Err(QueueError::Unavailable("queue disabled".to_string()));
        }
        if let Ok(mut jobs) = self.jobs.lock() {
            jobs.push(job.clone());
        }
        Ok(())
    }

    async fn health_check(&self) -> Result<(), QueueError> {
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Queue unavailable: {0}")]
    Unavailable(String),
}
