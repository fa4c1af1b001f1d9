//! AI generation worker logic.
//!
//! Takes one queued job, asks the model for a structured prediction and
//! writes the outcome back. Every failure path tries to mark the job
//! `failed` before returning; nothing is retried.

use chrono::{NaiveDate, Utc};
use garde::Validate;
use std::time::Instant;
use uuid::Uuid;

use crate::db::store::{PredictionStore, StoreError};
use crate::models::job::Category;
use crate::models::prediction::MatchPrediction;
use crate::services::gemini::{ModelError, PredictionModel};
use crate::services::outcome::parse_pick;
use crate::services::queue::QueuedGeneration;

/// How a generation attempt ended, as seen by the worker loop.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationOutcome {
    /// `processing -> pending`.
    Completed,
    /// `processing -> failed` with the recorded message.
    Failed(String),
    /// The job was no longer `processing`; nothing written.
    Skipped,
    /// Recording the failure itself failed; the job is still `processing`.
    Stuck(String),
}

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("AI model error: {0}")]
    Model(#[from] ModelError),

    #[error("Model output contained no JSON object")]
    NoJson,

    #[error("Model output was not valid prediction JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Model output failed validation: {0}")]
    Invalid(String),

    #[error("Failed to save prediction: {0}")]
    Store(#[from] StoreError),
}

/// Run generation for one job. Never returns an error: failures end up in
/// the job row when the store allows it.
pub async fn generate(
    store: &dyn PredictionStore,
    model: &dyn PredictionModel,
    job: &QueuedGeneration,
) -> GenerationOutcome {
    let started = Instant::now();

    let result = match produce_payload(model, job, Utc::now().date_naive()).await {
        Ok(payload) => store
            .complete_generation(job.job_id, payload)
            .await
            .map_err(GenerationError::from),
        Err(e) => Err(e),
    };

    metrics::histogram!("prediction_generation_seconds").record(started.elapsed().as_secs_f64());

    match result {
        Ok(true) => {
            metrics::counter!("predictions_generated_total").increment(1);
            tracing::info!(
                job_id = %job.job_id,
                duration_ms = started.elapsed().as_millis() as u64,
                "Prediction generated"
            );
            GenerationOutcome::Completed
        }
        Ok(false) => {
            tracing::warn!(job_id = %job.job_id, "Job was no longer processing, result discarded");
            GenerationOutcome::Skipped
        }
        Err(e) => record_failure(store, job.job_id, &e).await,
    }
}

async fn record_failure(
    store: &dyn PredictionStore,
    job_id: Uuid,
    error: &GenerationError,
) -> GenerationOutcome {
    metrics::counter!("predictions_failed_total").increment(1);
    let message = error.to_string();
    tracing::error!(job_id = %job_id, error = %message, "Prediction generation failed");

    match store.fail(job_id, &message).await {
        Ok(true) => GenerationOutcome::Failed(message),
        Ok(false) => {
            tracing::warn!(job_id = %job_id, "Job was no longer processing, failure not recorded");
            GenerationOutcome::Skipped
        }
        Err(e) => {
            tracing::error!(
                job_id = %job_id,
                error = %e,
                "Could not record generation failure; job left processing"
            );
            GenerationOutcome::Stuck(e.to_string())
        }
    }
}

async fn produce_payload(
    model: &dyn PredictionModel,
    job: &QueuedGeneration,
    today: NaiveDate,
) -> Result<serde_json::Value, GenerationError> {
    let prompt = build_prompt(&job.team_a, &job.team_b, job.category, today);

    tracing::debug!(job_id = %job.job_id, "Calling model");
    let response = model.generate(&prompt).await?;

    let mut prediction = parse_model_output(&response.text)?;
    prediction.pick = parse_pick(&prediction.prediction, &job.team_a, &job.team_b);
    prediction.sources = response.sources;

    if prediction.pick.is_none() {
        tracing::warn!(
            job_id = %job.job_id,
            prediction = %prediction.prediction,
            "Prediction text has no settleable pick"
        );
    }

    Ok(serde_json::to_value(&prediction)?)
}

/// Parse and validate the model's JSON answer, tolerating markdown code
/// fences and stray prose around the object.
pub fn parse_model_output(text: &str) -> Result<MatchPrediction, GenerationError> {
    let start = text.find('{').ok_or(GenerationError::NoJson)?;
    let end = text.rfind('}').ok_or(GenerationError::NoJson)?;
    if end < start {
        return Err(GenerationError::NoJson);
    }

    let prediction: MatchPrediction = serde_json::from_str(&text[start..=end])?;
    prediction
        .validate()
        .map_err(|report| GenerationError::Invalid(report.to_string()))?;

    Ok(prediction)
}

/// Prompt asking for a single JSON object in the stored payload's shape.
pub fn build_prompt(team_a: &str, team_b: &str, category: Category, today: NaiveDate) -> String {
    let competition = match category {
        Category::Men => "men's",
        Category::Women => "women's",
    };

    format!(
        r#"You are a football analyst. Today is {today}.
Research the latest team news, injuries, form and fixtures for the next {competition} football match between "{team_a}" (team A) and "{team_b}" (team B).

Respond with ONE JSON object and nothing else, using exactly these keys:
{{
  "prediction": "headline pick, e.g. \"{team_a} to Win\", \"Draw\", \"Over 2.5\" or \"Under 2.5\"",
  "confidence": "Low | Medium | High",
  "teamAWinProbability": "percentage string, e.g. \"45%\"",
  "drawProbability": "percentage string",
  "teamBWinProbability": "percentage string",
  "analysis": "a few paragraphs explaining the pick",
  "recentForm": {{ "teamA": "e.g. WWDLW", "teamB": "e.g. LDWWW" }},
  "headToHead": {{
    "summary": "short text",
    "teamAWins": 0, "draws": 0, "teamBWins": 0,
    "lastMeetings": [{{ "date": "YYYY-MM-DD", "score": "2-1", "competition": "name" }}]
  }},
  "bestBets": [{{ "category": "e.g. Result, Goals, Corners", "value": "the bet", "confidence": "Low | Medium | High" }}],
  "availability": {{ "teamA": "injuries and suspensions", "teamB": "injuries and suspensions" }},
  "venue": "stadium, city",
  "kickoff": "date and local kickoff time",
  "referee": "name or \"TBC\"",
  "leagueContext": "table positions and what is at stake",
  "playerStats": [{{ "player": "name", "team": "team name", "position": "FW", "goals": 0, "assists": 0, "appearances": 0 }}],
  "goalScorers": [{{ "player": "name", "team": "team name", "probability": "percentage string" }}],
  "goalCountProbabilities": {{ "zero": "percentage", "oneToTwo": "percentage", "threePlus": "percentage" }},
  "bothTeamsToScore": {{ "yes": "percentage", "no": "percentage" }},
  "overUnder25": {{ "over": "percentage", "under": "percentage" }}
}}
The three result probabilities must add up to 100%. Do not wrap the JSON in markdown."#
    )
}
