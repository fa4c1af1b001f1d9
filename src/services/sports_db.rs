//! TheSportsDB client.
//!
//! Used by the sync worker (recent events per team) and the live scores
//! sidebar (today's fixtures). Every request carries the configured timeout.

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::models::match_event::MatchEvent;

/// Source of real match data.
#[async_trait]
pub trait SportsData: Send + Sync {
    /// Recent and upcoming events involving `team`.
    async fn recent_events(&self, team: &str) -> Result<Vec<MatchEvent>, SportsDataError>;

    /// All football events scheduled on `date`.
    async fn events_on(&self, date: NaiveDate) -> Result<Vec<MatchEvent>, SportsDataError>;
}

pub struct SportsDbClient {
    http: Client,
    base_url: String,
    api_key: String,
}

#[derive(Deserialize)]
struct EventsEnvelope {
    #[serde(alias = "events")]
    event: Option<Vec<RawEvent>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEvent {
    id_event: Option<String>,
    str_home_team: Option<String>,
    str_away_team: Option<String>,
    int_home_score: Option<serde_json::Value>,
    int_away_score: Option<serde_json::Value>,
    str_status: Option<String>,
    str_league: Option<String>,
    str_sport: Option<String>,
    date_event: Option<String>,
    str_time: Option<String>,
    str_home_team_badge: Option<String>,
    str_away_team_badge: Option<String>,
}

/// Scores arrive as strings, numbers or null depending on the endpoint.
fn score(value: Option<serde_json::Value>) -> Option<i32> {
    match value? {
        serde_json::Value::Number(n) => n.as_i64().and_then(|n| i32::try_from(n).ok()),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

impl RawEvent {
    fn into_event(self) -> Option<MatchEvent> {
        if let Some(sport) = &self.str_sport {
            if !sport.eq_ignore_ascii_case("soccer") {
                return None;
            }
        }

        Some(MatchEvent {
            id: self.id_event?,
            home_team: non_empty(self.str_home_team)?,
            away_team: non_empty(self.str_away_team)?,
            home_score: score(self.int_home_score),
            away_score: score(self.int_away_score),
            status: self.str_status.unwrap_or_default(),
            league: self.str_league.unwrap_or_default(),
            date: non_empty(self.date_event),
            time: non_empty(self.str_time),
            home_logo: non_empty(self.str_home_team_badge),
            away_logo: non_empty(self.str_away_team_badge),
        })
    }
}

impl SportsDbClient {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self, SportsDataError> {
        let http = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    async fn fetch(&self, endpoint: &str, query: &[(&str, String)]) -> Result<Vec<MatchEvent>, SportsDataError> {
        let url = format!("{}/{}/{}", self.base_url, self.api_key, endpoint);

        let response = self.http.get(&url).query(query).send().await?;

        if !response.status().is_success() {
            return Err(SportsDataError::Unavailable(format!(
                "TheSportsDB returned HTTP {}",
                response.status()
            )));
        }

        let envelope: EventsEnvelope = response.json().await?;
        Ok(envelope
            .event
            .unwrap_or_default()
            .into_iter()
            .filter_map(RawEvent::into_event)
            .collect())
    }
}

#[async_trait]
impl SportsData for SportsDbClient {
    async fn recent_events(&self, team: &str) -> Result<Vec<MatchEvent>, SportsDataError> {
        self.fetch("searchevents.php", &[("e", team.to_string())]).await
    }

    async fn events_on(&self, date: NaiveDate) -> Result<Vec<MatchEvent>, SportsDataError> {
        self.fetch(
            "eventsday.php",
            &[("d", date.format("%Y-%m-%d").to_string()), ("s", "Soccer".to_string())],
        )
        .await
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SportsDataError {
    #[error("HTTP request to sports API failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Sports API unavailable: {0}")]
    Unavailable(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn client(server: &MockServer) -> SportsDbClient {
        SportsDbClient::new(&server.base_url(), "3", Duration::from_secs(8)).unwrap()
    }

    #[tokio::test]
    async fn test_recent_events_parses_scores_and_badges() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/3/searchevents.php").query_param("e", "Arsenal");
                then.status(200).json_body(json!({
                    "event": [
                        {
                            "idEvent": "101",
                            "strHomeTeam": "Arsenal",
                            "strAwayTeam": "Chelsea",
                            "intHomeScore": "2",
                            "intAwayScore": 1,
                            "strStatus": "Match Finished",
                            "strLeague": "English Premier League",
                            "strSport": "Soccer",
                            "dateEvent": "2026-10-18",
                            "strTime": "15:00:00",
                            "strHomeTeamBadge": "https://img/arsenal.png",
                            "strAwayTeamBadge": ""
                        },
                        {
                            "idEvent": "102",
                            "strHomeTeam": "Arsenal",
                            "strAwayTeam": "Tottenham",
                            "strSport": "Basketball"
                        }
                    ]
                }));
            })
            .await;

        let events = client(&server).recent_events("Arsenal").await.unwrap();
        mock.assert_async().await;

        assert_eq!(events.len(), 1);
        let event = &events[0];
        assert_eq!(event.home_score, Some(2));
        assert_eq!(event.away_score, Some(1));
        assert_eq!(event.home_logo.as_deref(), Some("https://img/arsenal.png"));
        assert_eq!(event.away_logo, None);
        assert_eq!(event.final_score(), Some((2, 1)));
    }

    #[tokio::test]
    async fn test_null_event_list_is_empty() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/3/eventsday.php").query_param("s", "Soccer");
                then.status(200).json_body(json!({ "events": null }));
            })
            .await;

        let date = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let events = client(&server).events_on(date).await.unwrap();
        assert!(events.is_empty());
    }

    #[tokio::test]
    async fn test_upstream_error_status() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET);
                then.status(503);
            })
            .await;

        let err = client(&server).recent_events("Chelsea").await.unwrap_err();
        assert!(matches!(err, SportsDataError::Unavailable(_)));
    }

    #[test]
    fn test_score_variants() {
        assert_eq!(score(Some(json!("3"))), Some(3));
        assert_eq!(score(Some(json!(0))), Some(0));
        assert_eq!(score(Some(json!(null))), None);
        assert_eq!(score(Some(json!(""))), None);
        assert_eq!(score(None), None);
    }
}
