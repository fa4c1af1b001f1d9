use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use garde::Validate;
use std::str::FromStr;
use uuid::Uuid;

use crate::app_state::AppState;
use crate::error::ApiError;
use crate::models::api::{
    DispatchData, DispatchResponse, HistoryQuery, PredictionRequest, PredictionStats, SyncResponse,
};
use crate::models::job::{Category, PredictionJob};
use crate::services::dispatcher::{self, Dispatch};
use crate::services::sync;

const DEFAULT_HISTORY_LIMIT: i64 = 20;
const MAX_HISTORY_LIMIT: i64 = 100;

/// POST /api/v1/predictions
///
/// 200 with the full job when a prediction already exists, 202 with the job
/// id when the caller has to poll.
pub async fn request_prediction(
    State(state): State<AppState>,
    payload: Result<Json<PredictionRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<DispatchResponse>), ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::Validation(e.body_text()))?;
    request.validate()?;

    let category = Category::from_str(request.category.trim())
        .map_err(|_| ApiError::Validation("category must be \"men\" or \"women\"".to_string()))?;

    let dispatch = dispatcher::request_job(
        state.store.as_ref(),
        state.queue.as_ref(),
        &request.team_a,
        &request.team_b,
        category,
        request.force_refresh,
    )
    .await?;

    let response = match dispatch {
        Dispatch::Cached(job) => (
            StatusCode::OK,
            Json(DispatchResponse {
                is_cached: true,
                data: DispatchData::Job(Box::new(job)),
            }),
        ),
        Dispatch::InFlight(job) => (
            StatusCode::ACCEPTED,
            Json(DispatchResponse {
                is_cached: false,
                data: DispatchData::Pending { job_id: job.id },
            }),
        ),
    };

    Ok(response)
}

/// GET /api/v1/predictions/{id}
pub async fn get_prediction(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PredictionJob>, ApiError> {
    let not_found = || ApiError::NotFound(format!("No prediction with id {id}"));

    let job_id = Uuid::parse_str(&id).map_err(|_| not_found())?;
    let job = state.store.get(job_id).await?.ok_or_else(not_found)?;

    Ok(Json(job))
}

/// GET /api/v1/predictions?limit=N
pub async fn list_predictions(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<PredictionJob>>, ApiError> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_HISTORY_LIMIT)
        .clamp(1, MAX_HISTORY_LIMIT);

    Ok(Json(state.store.list_recent(limit).await?))
}

/// POST /api/v1/predictions/sync
pub async fn sync_predictions(State(state): State<AppState>) -> Result<Json<SyncResponse>, ApiError> {
    let summary = sync::sync_pending_predictions(state.store.as_ref(), state.sports.as_ref()).await?;

    Ok(Json(SyncResponse {
        message: summary.message(),
    }))
}

/// GET /api/v1/stats
pub async fn prediction_stats(State(state): State<AppState>) -> Result<Json<PredictionStats>, ApiError> {
    Ok(Json(state.store.stats().await?))
}
