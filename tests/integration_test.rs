mod fixtures;

use async_trait::async_trait;
use chrono::{Duration, NaiveDate, Utc};
use match_predictor::{
    config::AppConfig,
    db::{
        self,
        store::{AttachOutcome, MemoryPredictionStore, PgPredictionStore, PredictionStore},
    },
    models::job::{Category, JobStatus, PredictionJob},
    models::match_event::MatchEvent,
    services::{
        dispatcher::{self, Dispatch},
        gemini::{ModelError, ModelResponse, PredictionModel},
        generation::{self, GenerationOutcome},
        queue::{GenerationQueue, JobQueue, QueuedGeneration, RecordingQueue},
        sports_db::{SportsData, SportsDataError},
        sync,
    },
};
use serde_json::json;

struct CannedModel;

#[async_trait]
impl PredictionModel for CannedModel {
    async fn generate(&self, prompt: &str) -> Result<ModelResponse, ModelError> {
        assert!(prompt.contains("Manchester United"));
        Ok(ModelResponse {
            text: json!({
                "prediction": "Manchester United to Win",
                "confidence": "Medium",
                "teamAWinProbability": "48%",
                "drawProbability": "27%",
                "teamBWinProbability": "25%",
                "analysis": "Home form has been strong."
            })
            .to_string(),
            sources: vec![],
        })
    }
}

struct FinalScore;

#[async_trait]
impl SportsData for FinalScore {
    async fn recent_events(&self, _team: &str) -> Result<Vec<MatchEvent>, SportsDataError> {
        let kickoff = Utc::now() + Duration::hours(2);
        Ok(vec![MatchEvent {
            id: "1".into(),
            home_team: "Man United".into(),
            away_team: "Tottenham".into(),
            home_score: Some(3),
            away_score: Some(0),
            status: "FT".into(),
            league: "English Premier League".into(),
            date: Some(kickoff.format("%Y-%m-%d").to_string()),
            time: Some(kickoff.format("%H:%M:%S").to_string()),
            home_logo: Some("https://img/mu.png".into()),
            away_logo: Some("https://img/spurs.png".into()),
        }])
    }

    async fn events_on(&self, _date: NaiveDate) -> Result<Vec<MatchEvent>, SportsDataError> {
        Ok(vec![])
    }
}

/// Dispatch, generate, serve from cache and settle, all in process.
#[tokio::test]
async fn test_prediction_lifecycle_in_memory() {
    let store = MemoryPredictionStore::new();
    let queue = RecordingQueue::new();

    let dispatch = dispatcher::request_job(&store, &queue, "man utd", "Spurs", Category::Men, false)
        .await
        .expect("dispatch failed");
    let Dispatch::InFlight(job) = dispatch else {
        panic!("fresh fixture must be generated");
    };

    let queued = queue.enqueued().pop().expect("nothing queued");
    assert_eq!(queued.job_id, job.id);
    assert_eq!(queued.team_a, "Manchester United");
    assert_eq!(queued.team_b, "Tottenham Hotspur");

    let outcome = generation::generate(&store, &CannedModel, &queued).await;
    assert_eq!(outcome, GenerationOutcome::Completed);

    let cached = dispatcher::request_job(&store, &queue, "Tottenham", "Manchester United", Category::Men, false)
        .await
        .expect("second dispatch failed");
    assert!(cached.is_cached());
    assert_eq!(cached.job().tally, 2);
    assert_eq!(cached.job().status, JobStatus::Pending);
    assert_eq!(cached.job().result_payload["pick"]["kind"], "team_win");

    let summary = sync::sync_pending_predictions(&store, &FinalScore)
        .await
        .expect("sync failed");
    assert_eq!(summary.won, 1);

    let settled = store.get(job.id).await.unwrap().unwrap();
    assert_eq!(settled.status, JobStatus::Won);
    assert_eq!(settled.team_a_logo.as_deref(), Some("https://img/mu.png"));
    assert_eq!(settled.team_b_logo.as_deref(), Some("https://img/spurs.png"));

    let stats = store.stats().await.unwrap();
    assert_eq!(stats.won, 1);
    assert_eq!(stats.accuracy, Some(1.0));
}

/// Postgres store: atomic dedup, forward-only writes, history and stats.
///
/// Note: This requires a running PostgreSQL instance configured via
/// environment variables.
#[tokio::test]
#[ignore] // Run with: cargo test --test integration_test -- --ignored
async fn test_postgres_store() {
    let config = AppConfig::from_env().expect("Failed to load config");

    let db_pool = db::init_pool(&config.database_url)
        .await
        .expect("Failed to connect to database");
    db::run_migrations(&db_pool)
        .await
        .expect("Failed to run migrations");
    let store = PgPredictionStore::new(db_pool);
    store.ping().await.expect("Ping failed");

    let (team_a, team_b) = fixtures::unique_fixture("Store");
    let since = Utc::now() - Duration::hours(24);

    // 1. Concurrent attach_or_create calls share one row
    let attempts = (0..6).map(|i| {
        let (a, b) = if i % 2 == 0 { (&team_a, &team_b) } else { (&team_b, &team_a) };
        store.attach_or_create(PredictionJob::new_processing(a.clone(), b.clone(), Category::Men), since)
    });
    let results: Vec<_> = futures::future::join_all(attempts)
        .await
        .into_iter()
        .map(|r| r.expect("attach_or_create failed"))
        .collect();

    let created: Vec<_> = results
        .iter()
        .filter_map(|r| match r {
            AttachOutcome::Created(job) => Some(job.clone()),
            AttachOutcome::Attached(_) => None,
        })
        .collect();
    assert_eq!(created.len(), 1, "exactly one insert per fixture");
    let job = &created[0];

    let stored = store.get(job.id).await.unwrap().expect("Job not found");
    assert_eq!(stored.tally, 6);
    assert_eq!(stored.status, JobStatus::Processing);

    // 2. Forward-only transitions
    assert!(!store.resolve(job.id, JobStatus::Won, None, None).await.unwrap());
    assert!(store
        .complete_generation(job.id, json!({"prediction": "Draw"}))
        .await
        .unwrap());
    assert!(!store.fail(job.id, "too late").await.unwrap());
    assert!(store
        .resolve(job.id, JobStatus::Lost, Some("a.png".into()), None)
        .await
        .unwrap());

    let resolved = store.get(job.id).await.unwrap().unwrap();
    assert_eq!(resolved.status, JobStatus::Lost);
    assert_eq!(resolved.team_a_logo.as_deref(), Some("a.png"));
    assert_eq!(resolved.result_payload["prediction"], "Draw");

    // 3. History and stats see the job
    let recent = store.list_recent(100).await.unwrap();
    assert!(recent.iter().any(|j| j.id == job.id));
    let stats = store.stats().await.unwrap();
    assert!(stats.lost >= 1);
    assert!(stats.accuracy.is_some());

    // 4. A failed job is not reused
    let (x, y) = fixtures::unique_fixture("Failed");
    let first = store
        .insert(PredictionJob::new_processing(x.clone(), y.clone(), Category::Women))
        .await
        .unwrap();
    store.fail(first.id, "model blocked").await.unwrap();
    let retry = store
        .attach_or_create(PredictionJob::new_processing(y, x, Category::Women), since)
        .await
        .unwrap();
    assert!(matches!(retry, AttachOutcome::Created(ref j) if j.id != first.id));

    println!("✅ Postgres store checks passed");
}

/// Redis queue: enqueue, dequeue into the processing list, complete.
#[tokio::test]
#[ignore] // Requires an otherwise idle Redis configured via REDIS_URL
async fn test_redis_queue() {
    let config = AppConfig::from_env().expect("Failed to load config");
    let queue = JobQueue::new(&config.redis_url).expect("Failed to initialize queue");
    queue.health_check().await.expect("Redis unreachable");

    let queued = QueuedGeneration {
        job_id: uuid::Uuid::new_v4(),
        team_a: "Arsenal".into(),
        team_b: "Chelsea".into(),
        category: Category::Men,
    };
    queue.enqueue(&queued).await.expect("Failed to enqueue");

    let dequeued = queue
        .dequeue()
        .await
        .expect("Failed to dequeue")
        .expect("No job in queue");

    assert_eq!(dequeued, queued);
    queue.complete(&dequeued).await.expect("Failed to complete job in queue");
}
