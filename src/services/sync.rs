//! Status sync: settle pending predictions against real results.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

use crate::db::store::{PredictionStore, StoreError};
use crate::models::job::{JobStatus, PredictionJob};
use crate::models::match_event::MatchEvent;
use crate::models::prediction::Pick;
use crate::services::outcome::{parse_pick, settle, Outcome};
use crate::services::sports_db::SportsData;
use crate::services::team_names::same_team;

/// Only predictions younger than this are checked.
pub const SYNC_LOOKBACK_DAYS: i64 = 7;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncSummary {
    pub checked: usize,
    pub updated: usize,
    pub won: usize,
    pub lost: usize,
    /// Finished match found but the prediction had no settleable pick.
    pub unresolved: usize,
    pub fetch_errors: usize,
}

impl SyncSummary {
    pub fn message(&self) -> String {
        format!(
            "Checked {} pending predictions, updated {} ({} won, {} lost)",
            self.checked, self.updated, self.won, self.lost
        )
    }
}

/// Look up results for every pending prediction from the last week and
/// resolve those whose match has finished.
///
/// A failed fetch for one team only leaves that team's jobs pending.
pub async fn sync_pending_predictions(
    store: &dyn PredictionStore,
    source: &dyn SportsData,
) -> Result<SyncSummary, StoreError> {
    let since = Utc::now() - Duration::days(SYNC_LOOKBACK_DAYS);
    let pending = store.pending_since(since).await?;

    let mut summary = SyncSummary {
        checked: pending.len(),
        ..Default::default()
    };

    if pending.is_empty() {
        tracing::info!("No pending predictions to sync");
        return Ok(summary);
    }

    let teams: BTreeSet<&str> = pending
        .iter()
        .flat_map(|job| [job.team_a.as_str(), job.team_b.as_str()])
        .collect();

    let mut events_by_team: HashMap<&str, Vec<MatchEvent>> = HashMap::new();
    for team in teams {
        match source.recent_events(team).await {
            Ok(events) => {
                events_by_team.insert(team, events);
            }
            Err(e) => {
                summary.fetch_errors += 1;
                tracing::warn!(team = %team, error = %e, "Failed to fetch events for team");
            }
        }
    }

    for job in &pending {
        let candidates = [job.team_a.as_str(), job.team_b.as_str()]
            .into_iter()
            .filter_map(|team| events_by_team.get(team))
            .flatten();

        let Some(event) = find_finished_match(job, candidates) else {
            continue;
        };

        let Some(pick) = stored_pick(job) else {
            summary.unresolved += 1;
            tracing::warn!(job_id = %job.id, "Finished match found but prediction has no settleable pick");
            continue;
        };

        let Some(outcome) = settle(&pick, event) else {
            summary.unresolved += 1;
            continue;
        };

        let (team_a_logo, team_b_logo) = if same_team(&job.team_a, &event.home_team) {
            (event.home_logo.clone(), event.away_logo.clone())
        } else {
            (event.away_logo.clone(), event.home_logo.clone())
        };

        let status = JobStatus::from(outcome);
        match store.resolve(job.id, status, team_a_logo, team_b_logo).await {
            Ok(true) => {
                summary.updated += 1;
                match outcome {
                    Outcome::Won => summary.won += 1,
                    Outcome::Lost => summary.lost += 1,
                }
                metrics::counter!("predictions_resolved_total", "outcome" => status.to_string()).increment(1);
                tracing::info!(
                    job_id = %job.id,
                    status = %status,
                    score = %format!("{}-{}", event.home_score.unwrap_or_default(), event.away_score.unwrap_or_default()),
                    "Prediction resolved"
                );
            }
            Ok(false) => {
                tracing::debug!(job_id = %job.id, "Job changed state before it could be resolved");
            }
            Err(e) => {
                tracing::error!(job_id = %job.id, error = %e, "Failed to resolve prediction");
            }
        }
    }

    tracing::info!(
        checked = summary.checked,
        updated = summary.updated,
        unresolved = summary.unresolved,
        fetch_errors = summary.fetch_errors,
        "Sync complete"
    );

    Ok(summary)
}

/// Earliest finished event between the job's two teams that kicked off after
/// the prediction was made. Undated events are kept but ranked last.
fn find_finished_match<'a>(
    job: &PredictionJob,
    events: impl Iterator<Item = &'a MatchEvent>,
) -> Option<&'a MatchEvent> {
    events
        .filter(|e| e.final_score().is_some())
        .filter(|e| {
            (same_team(&e.home_team, &job.team_a) && same_team(&e.away_team, &job.team_b))
                || (same_team(&e.home_team, &job.team_b) && same_team(&e.away_team, &job.team_a))
        })
        .filter(|e| played_after(e, job.created_at))
        .min_by_key(|e| kickoff_rank(e))
}

/// Without a kickoff time only the match day can be compared.
fn played_after(event: &MatchEvent, created_at: DateTime<Utc>) -> bool {
    let Some(date) = event_date(event) else {
        return true;
    };
    match event_time(event) {
        Some(time) => date.and_time(time).and_utc() >= created_at,
        None => date >= created_at.date_naive(),
    }
}

fn kickoff_rank(event: &MatchEvent) -> NaiveDateTime {
    match event_date(event) {
        Some(date) => date.and_time(event_time(event).unwrap_or(NaiveTime::MIN)),
        None => NaiveDateTime::MAX,
    }
}

fn event_date(event: &MatchEvent) -> Option<NaiveDate> {
    event
        .date
        .as_deref()
        .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
}

/// Kickoff time in UTC. TheSportsDB lists unknown kickoffs as midnight.
fn event_time(event: &MatchEvent) -> Option<NaiveTime> {
    let raw = event.time.as_deref()?.trim();
    let time = NaiveTime::parse_from_str(raw, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
        .ok()?;
    (time != NaiveTime::MIN).then_some(time)
}

/// The pick stored at generation time, or one derived from the text for
/// payloads written before picks existed.
fn stored_pick(job: &PredictionJob) -> Option<Pick> {
    if let Some(value) = job.result_payload.get("pick") {
        if let Ok(pick) = serde_json::from_value::<Pick>(value.clone()) {
            return Some(pick);
        }
    }

    let text = job.result_payload.get("prediction")?.as_str()?;
    parse_pick(text, &job.team_a, &job.team_b)
}
