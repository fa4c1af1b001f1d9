use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

/// Lifecycle status of a prediction job.
///
/// `Processing` means generation is in flight, `Pending` means a prediction
/// exists but the real match has not been matched yet. `Won`, `Lost` and
/// `Failed` are final.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, EnumString, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum JobStatus {
    Processing,
    Pending,
    Won,
    Lost,
    Failed,
}

impl JobStatus {
    /// Whether a worker may move a job from `self` to `next`.
    ///
    /// Generation owns `processing -> pending|failed`, the sync worker owns
    /// `pending -> won|lost`. Nothing else is allowed.
    pub fn can_transition_to(self, next: JobStatus) -> bool {
        matches!(
            (self, next),
            (JobStatus::Processing, JobStatus::Pending)
                | (JobStatus::Processing, JobStatus::Failed)
                | (JobStatus::Pending, JobStatus::Won)
                | (JobStatus::Pending, JobStatus::Lost)
        )
    }

    /// A prediction is available (possibly already resolved).
    pub fn has_prediction(self) -> bool {
        matches!(self, JobStatus::Pending | JobStatus::Won | JobStatus::Lost)
    }

    pub fn is_terminal(self) -> bool {
        self != JobStatus::Processing
    }
}

/// Competition the fixture belongs to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, EnumString, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Category {
    Men,
    Women,
}

/// One request for a prediction on a specific fixture.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PredictionJob {
    pub id: Uuid,
    pub team_a: String,
    pub team_b: String,
    pub category: Category,
    pub status: JobStatus,
    pub result_payload: serde_json::Value,
    pub tally: i32,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub team_a_logo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub team_b_logo: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl PredictionJob {
    /// A fresh job as inserted by the dispatcher on a cache miss.
    pub fn new_processing(team_a: String, team_b: String, category: Category) -> Self {
        Self {
            id: Uuid::new_v4(),
            team_a,
            team_b,
            category,
            status: JobStatus::Processing,
            result_payload: serde_json::json!({}),
            tally: 1,
            team_a_logo: None,
            team_b_logo: None,
            created_at: Utc::now(),
        }
    }

    /// Same real-world fixture, in either team order, ignoring case.
    pub fn is_fixture(&self, team_a: &str, team_b: &str, category: Category) -> bool {
        let same = |x: &str, y: &str| x.eq_ignore_ascii_case(y);
        self.category == category
            && ((same(&self.team_a, team_a) && same(&self.team_b, team_b))
                || (same(&self.team_a, team_b) && same(&self.team_b, team_a)))
    }

    /// The `error` descriptor recorded by a failed generation.
    pub fn error_message(&self) -> Option<&str> {
        self.result_payload.get("error").and_then(|e| e.as_str())
    }
}

/// Order-independent key identifying a fixture, e.g. `men:arsenal|chelsea`.
pub fn fixture_key(team_a: &str, team_b: &str, category: Category) -> String {
    let a = team_a.to_lowercase();
    let b = team_b.to_lowercase();
    let (first, second) = if a <= b { (a, b) } else { (b, a) };
    format!("{}:{}|{}", category, first, second)
}
