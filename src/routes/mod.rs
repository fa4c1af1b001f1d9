use axum::routing::{get, post};
use axum::Router;

use crate::app_state::AppState;

pub mod health;
pub mod live_scores;
pub mod metrics;
pub mod predictions;

/// API routes plus `/health`. The server adds `/metrics` and the tower layers.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route(
            "/api/v1/predictions",
            post(predictions::request_prediction).get(predictions::list_predictions),
        )
        .route("/api/v1/predictions/sync", post(predictions::sync_predictions))
        .route("/api/v1/predictions/{id}", get(predictions::get_prediction))
        .route("/api/v1/live-scores", get(live_scores::live_scores))
        .route("/api/v1/stats", get(predictions::prediction_stats))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::store::{MemoryPredictionStore, PredictionStore};
    use crate::models::job::{Category, JobStatus, PredictionJob};
    use crate::models::match_event::MatchEvent;
    use crate::services::queue::RecordingQueue;
    use crate::services::sports_db::{SportsData, SportsDataError};
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use chrono::{NaiveDate, Utc};
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use tower::ServiceExt;

    #[derive(Default)]
    struct StubSports {
        events: Vec<MatchEvent>,
        down: AtomicBool,
    }

    #[async_trait]
    impl SportsData for StubSports {
        async fn recent_events(&self, team: &str) -> Result<Vec<MatchEvent>, SportsDataError> {
            if self.down.load(Ordering::SeqCst) {
                return Err(SportsDataError::Unavailable("down".into()));
            }
            Ok(self
                .events
                .iter()
                .filter(|e| e.home_team == team || e.away_team == team)
                .cloned()
                .collect())
        }

        async fn events_on(&self, _date: NaiveDate) -> Result<Vec<MatchEvent>, SportsDataError> {
            if self.down.load(Ordering::SeqCst) {
                return Err(SportsDataError::Unavailable("down".into()));
            }
            Ok(self.events.clone())
        }
    }

    struct Harness {
        store: Arc<MemoryPredictionStore>,
        queue: Arc<RecordingQueue>,
        sports: Arc<StubSports>,
    }

    impl Harness {
        fn new(events: Vec<MatchEvent>) -> Self {
            Self {
                store: Arc::new(MemoryPredictionStore::new()),
                queue: Arc::new(RecordingQueue::new()),
                sports: Arc::new(StubSports {
                    events,
                    ..Default::default()
                }),
            }
        }

        fn app(&self) -> Router {
            router(AppState {
                store: self.store.clone(),
                queue: self.queue.clone(),
                sports: self.sports.clone(),
                leagues: Arc::new(vec!["English Premier League".to_string()]),
            })
        }

        async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
            let response = self.app().oneshot(request).await.unwrap();
            let status = response.status();
            let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
            let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
            (status, body)
        }
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn event(home: &str, away: &str, status: &str, league: &str, score: Option<(i32, i32)>) -> MatchEvent {
        let kickoff = Utc::now() + chrono::Duration::hours(2);
        MatchEvent {
            id: format!("{home}-{away}"),
            home_team: home.into(),
            away_team: away.into(),
            home_score: score.map(|s| s.0),
            away_score: score.map(|s| s.1),
            status: status.into(),
            league: league.into(),
            date: Some(kickoff.format("%Y-%m-%d").to_string()),
            time: Some(kickoff.format("%H:%M:%S").to_string()),
            home_logo: Some(format!("https://img/{}.png", home.to_lowercase())),
            away_logo: Some(format!("https://img/{}.png", away.to_lowercase())),
        }
    }

    #[tokio::test]
    async fn test_dispatch_then_reverse_order_attaches() {
        let h = Harness::new(vec![]);

        let (status, first) = h
            .send(post_json(
                "/api/v1/predictions",
                json!({"teamA": "Arsenal", "teamB": "Chelsea", "category": "men"}),
            ))
            .await;
        assert_eq!(status, StatusCode::ACCEPTED);
        assert_eq!(first["isCached"], false);
        let job_id = first["data"]["jobId"].as_str().unwrap().to_string();

        let (status, second) = h
            .send(post_json(
                "/api/v1/predictions",
                json!({"teamA": "Chelsea", "teamB": "Arsenal", "category": "men"}),
            ))
            .await;
        assert_eq!(status, StatusCode::ACCEPTED);
        assert_eq!(second["data"]["jobId"], job_id.as_str());

        let (status, job) = h.send(get(&format!("/api/v1/predictions/{job_id}"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(job["status"], "processing");
        assert_eq!(job["tally"], 2);
        assert_eq!(h.queue.enqueued().len(), 1);
    }

    #[tokio::test]
    async fn test_cached_prediction_returns_full_job() {
        let h = Harness::new(vec![]);
        let mut job = PredictionJob::new_processing("Arsenal".into(), "Chelsea".into(), Category::Women);
        job.status = JobStatus::Pending;
        job.result_payload = json!({"prediction": "Draw"});
        h.store.seed(job.clone());

        let (status, body) = h
            .send(post_json(
                "/api/v1/predictions",
                json!({"teamA": "chelsea", "teamB": "arsenal", "category": "Women"}),
            ))
            .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["isCached"], true);
        assert_eq!(body["data"]["id"], job.id.to_string());
        assert_eq!(body["data"]["resultPayload"]["fromCache"], true);
        assert!(h.queue.enqueued().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_requests_are_400() {
        let h = Harness::new(vec![]);

        for body in [
            json!({"teamA": "", "teamB": "Chelsea", "category": "men"}),
            json!({"teamA": "Arsenal", "teamB": "Chelsea", "category": "mixed"}),
            json!({"teamA": "Man Utd", "teamB": "Manchester United", "category": "men"}),
            json!({"teamA": "Arsenal"}),
        ] {
            let (status, response) = h.send(post_json("/api/v1/predictions", body)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(response["error"], "validation_error");
        }
        assert!(h.queue.enqueued().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_job_is_404() {
        let h = Harness::new(vec![]);

        let (status, body) = h.send(get(&format!("/api/v1/predictions/{}", uuid::Uuid::new_v4()))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "not_found");

        let (status, _) = h.send(get("/api/v1/predictions/not-a-uuid")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_store_outage_is_503_with_generic_message() {
        let h = Harness::new(vec![]);
        h.store.fail_next_writes(1);

        let (status, body) = h
            .send(post_json(
                "/api/v1/predictions",
                json!({"teamA": "Arsenal", "teamB": "Chelsea", "category": "men"}),
            ))
            .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"], "service_unavailable");
        assert!(!body["message"].as_str().unwrap().contains("injected"));
    }

    #[tokio::test]
    async fn test_queue_outage_is_503() {
        let h = Harness::new(vec![]);
        h.queue.set_failing(true);

        let (status, _) = h
            .send(post_json(
                "/api/v1/predictions",
                json!({"teamA": "Arsenal", "teamB": "Chelsea", "category": "men"}),
            ))
            .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_sync_resolves_and_updates_stats() {
        let h = Harness::new(vec![event(
            "Arsenal",
            "Chelsea",
            "Match Finished",
            "English Premier League",
            Some((2, 1)),
        )]);
        let mut job = PredictionJob::new_processing("Arsenal".into(), "Chelsea".into(), Category::Men);
        job.status = JobStatus::Pending;
        job.result_payload = json!({"prediction": "Arsenal to Win"});
        h.store.seed(job.clone());

        let (status, body) = h
            .send(Request::builder().method("POST").uri("/api/v1/predictions/sync").body(Body::empty()).unwrap())
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Checked 1 pending predictions, updated 1 (1 won, 0 lost)");

        let (_, stats) = h.send(get("/api/v1/stats")).await;
        assert_eq!(stats["total"], 1);
        assert_eq!(stats["won"], 1);
        assert_eq!(stats["accuracy"], 1.0);

        let stored = h.store.get(job.id).await.unwrap().unwrap();
        assert_eq!(stored.status, JobStatus::Won);
        assert_eq!(stored.team_a_logo.as_deref(), Some("https://img/arsenal.png"));
    }

    #[tokio::test]
    async fn test_history_is_newest_first_and_clamped() {
        let h = Harness::new(vec![]);
        for i in 0..3 {
            let mut job = PredictionJob::new_processing(format!("Home {i}"), format!("Away {i}"), Category::Men);
            job.created_at = Utc::now() - chrono::Duration::minutes(10 - i);
            h.store.seed(job);
        }

        let (status, body) = h.send(get("/api/v1/predictions?limit=0")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 1);
        assert_eq!(body[0]["teamA"], "Home 2");

        let (_, body) = h.send(get("/api/v1/predictions")).await;
        assert_eq!(body.as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_live_scores_filters_and_sorts() {
        let h = Harness::new(vec![
            event("Lyon", "Nice", "1H", "French Ligue 1", Some((0, 0))),
            event("Everton", "Fulham", "FT", "English Premier League", Some((1, 0))),
            event("Arsenal", "Chelsea", "2H", "English Premier League", Some((1, 1))),
        ]);

        let (status, body) = h.send(get("/api/v1/live-scores")).await;
        assert_eq!(status, StatusCode::OK);
        let rows = body.as_array().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["homeTeam"], "Arsenal");
        assert_eq!(rows[0]["phase"], "live");
        assert_eq!(rows[1]["phase"], "finished");
    }

    #[tokio::test]
    async fn test_live_scores_upstream_failure_is_502() {
        let h = Harness::new(vec![]);
        h.sports.down.store(true, Ordering::SeqCst);

        let (status, body) = h.send(get("/api/v1/live-scores")).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"], "upstream_error");
    }

    #[tokio::test]
    async fn test_health_reports_components() {
        let h = Harness::new(vec![]);
        let (status, body) = h.send(get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["checks"]["database"]["status"], "ok");
        assert_eq!(body["checks"]["queue"]["status"], "ok");
    }
}
