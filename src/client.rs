//! HTTP client for the prediction API, used by frontends and the e2e tests.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use uuid::Uuid;

use crate::models::api::DispatchResponse;
use crate::models::job::{Category, PredictionJob};
use crate::models::match_event::LiveMatch;
use crate::poller::JobStatusSource;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Prediction not found")]
    NotFound,

    #[error("API returned HTTP {status}: {message}")]
    Api { status: u16, message: String },
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let http = Client::builder().timeout(Duration::from_secs(15)).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// `POST /api/v1/predictions`
    pub async fn request_job(
        &self,
        team_a: &str,
        team_b: &str,
        category: Category,
        force_refresh: bool,
    ) -> Result<DispatchResponse, ClientError> {
        let response = self
            .http
            .post(format!("{}/api/v1/predictions", self.base_url))
            .json(&serde_json::json!({
                "teamA": team_a,
                "teamB": team_b,
                "category": category,
                "forceRefresh": force_refresh,
            }))
            .send()
            .await?;

        Ok(check(response).await?.json().await?)
    }

    /// `GET /api/v1/predictions/{id}`
    pub async fn get_job(&self, job_id: Uuid) -> Result<PredictionJob, ClientError> {
        let response = self
            .http
            .get(format!("{}/api/v1/predictions/{}", self.base_url, job_id))
            .send()
            .await?;

        Ok(check(response).await?.json().await?)
    }

    /// `GET /api/v1/live-scores`
    pub async fn live_scores(&self) -> Result<Vec<LiveMatch>, ClientError> {
        let response = self
            .http
            .get(format!("{}/api/v1/live-scores", self.base_url))
            .send()
            .await?;

        Ok(check(response).await?.json().await?)
    }
}

async fn check(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::NOT_FOUND {
        return Err(ClientError::NotFound);
    }

    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&text)
        .map(|b| b.message)
        .unwrap_or(text);
    Err(ClientError::Api {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl JobStatusSource for ApiClient {
    async fn fetch_job(&self, job_id: Uuid) -> Result<PredictionJob, ClientError> {
        self.get_job(job_id).await
    }
}
