//! Test helper utilities for E2E testing

use match_predictor::client::ApiClient;
use match_predictor::models::job::{JobStatus, PredictionJob};
use match_predictor::models::prediction::MatchPrediction;
use std::sync::Arc;

/// Base URL from `API_BASE_URL`, defaulting to localhost
pub fn base_url() -> String {
    std::env::var("API_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

pub fn api_client() -> Arc<ApiClient> {
    Arc::new(ApiClient::new(&base_url()).expect("Failed to build API client"))
}

/// Assert a settled job carries a well-formed prediction payload
pub fn assert_prediction_payload(job: &PredictionJob) {
    assert!(
        job.status.has_prediction(),
        "Job {} has no prediction (status {})",
        job.id,
        job.status
    );

    let prediction: MatchPrediction = serde_json::from_value(job.result_payload.clone())
        .unwrap_or_else(|e| panic!("Payload of {} is not a prediction: {}", job.id, e));

    assert!(!prediction.prediction.trim().is_empty(), "Empty prediction text");
    assert!(!prediction.confidence.trim().is_empty(), "Missing confidence");

    println!(
        "  ✓ {} vs {} - {} ({}), status: {}",
        job.team_a,
        job.team_b,
        prediction.prediction,
        prediction.confidence,
        job.status
    );
}

pub fn is_settled(status: JobStatus) -> bool {
    matches!(status, JobStatus::Won | JobStatus::Lost)
}
