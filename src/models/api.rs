use garde::Validate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::job::PredictionJob;

/// Body of `POST /api/v1/predictions`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PredictionRequest {
    #[garde(custom(team_name))]
    pub team_a: String,

    #[garde(custom(team_name))]
    pub team_b: String,

    /// "men" or "women"; parsed after validation.
    #[garde(length(min = 1, max = 10))]
    pub category: String,

    #[garde(skip)]
    #[serde(default)]
    pub force_refresh: bool,
}

/// Either the full job (cache hit) or just its id (poll for it).
#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum DispatchData {
    Job(Box<PredictionJob>),
    Pending {
        #[serde(rename = "jobId")]
        job_id: Uuid,
    },
}

/// Response of `POST /api/v1/predictions`.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DispatchResponse {
    pub is_cached: bool,
    pub data: DispatchData,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SyncResponse {
    pub message: String,
}

/// Aggregate counts over all stored predictions.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PredictionStats {
    pub total: i64,
    pub processing: i64,
    pub pending: i64,
    pub won: i64,
    pub lost: i64,
    pub failed: i64,
    /// `won / (won + lost)`, absent until something resolved.
    pub accuracy: Option<f64>,
}

impl PredictionStats {
    pub fn with_accuracy(mut self) -> Self {
        let resolved = self.won + self.lost;
        self.accuracy = if resolved > 0 {
            Some(self.won as f64 / resolved as f64)
        } else {
            None
        };
        self
    }
}

/// Longest team name accepted, in characters after trimming.
pub const MAX_TEAM_NAME_CHARS: usize = 100;

fn team_name(value: &str, _ctx: &()) -> garde::Result {
    let chars = value.trim().chars().count();
    if chars == 0 {
        return Err(garde::Error::new("team name must not be blank"));
    }
    if chars > MAX_TEAM_NAME_CHARS {
        return Err(garde::Error::new(format!(
            "team name must be at most {MAX_TEAM_NAME_CHARS} characters"
        )));
    }
    Ok(())
}
