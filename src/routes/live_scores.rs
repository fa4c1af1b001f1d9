use axum::extract::State;
use axum::Json;
use chrono::Utc;

use crate::app_state::AppState;
use crate::error::ApiError;
use crate::models::match_event::LiveMatch;
use crate::services::live_scores::fetch_live_scores;

/// GET /api/v1/live-scores
pub async fn live_scores(State(state): State<AppState>) -> Result<Json<Vec<LiveMatch>>, ApiError> {
    let today = Utc::now().date_naive();
    let matches = fetch_live_scores(state.sports.as_ref(), &state.leagues, today).await?;
    Ok(Json(matches))
}
