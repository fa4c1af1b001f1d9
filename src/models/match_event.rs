use serde::{Deserialize, Serialize};

/// A football fixture as reported by the sports data provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MatchEvent {
    pub id: String,
    pub home_team: String,
    pub away_team: String,
    pub home_score: Option<i32>,
    pub away_score: Option<i32>,
    /// Provider status text ("FT", "HT", "1H", "Match Finished", "NS", ...).
    pub status: String,
    pub league: String,
    /// Kickoff date, `YYYY-MM-DD`.
    pub date: Option<String>,
    /// Kickoff time, `HH:MM:SS`.
    pub time: Option<String>,
    pub home_logo: Option<String>,
    pub away_logo: Option<String>,
}

/// Coarse phase of a fixture, ordered by how interesting it is to show.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum MatchPhase {
    Live,
    HalfTime,
    Finished,
    Other,
}

impl MatchPhase {
    pub fn from_status(status: &str) -> Self {
        let s = status.trim().to_uppercase();
        match s.as_str() {
            "HT" | "HALF TIME" | "HALFTIME" => MatchPhase::HalfTime,
            "FT" | "AET" | "PEN" | "AP" | "MATCH FINISHED" | "FINISHED" => MatchPhase::Finished,
            "1H" | "2H" | "ET" | "BT" | "P" | "LIVE" | "IN PLAY" => MatchPhase::Live,
            _ if s.starts_with("MATCH FINISHED") => MatchPhase::Finished,
            _ => MatchPhase::Other,
        }
    }
}

impl MatchEvent {
    pub fn phase(&self) -> MatchPhase {
        MatchPhase::from_status(&self.status)
    }

    /// Finished with both scores known.
    pub fn final_score(&self) -> Option<(i32, i32)> {
        if self.phase() != MatchPhase::Finished {
            return None;
        }
        Some((self.home_score?, self.away_score?))
    }
}

/// Row returned by the live scores endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LiveMatch {
    pub id: String,
    pub league: String,
    pub home_team: String,
    pub away_team: String,
    pub home_score: Option<i32>,
    pub away_score: Option<i32>,
    pub status: String,
    pub phase: MatchPhase,
    pub kickoff: Option<String>,
    pub home_logo: Option<String>,
    pub away_logo: Option<String>,
}

impl From<MatchEvent> for LiveMatch {
    fn from(event: MatchEvent) -> Self {
        let phase = event.phase();
        Self {
            id: event.id,
            league: event.league,
            home_team: event.home_team,
            away_team: event.away_team,
            home_score: event.home_score,
            away_score: event.away_score,
            status: event.status,
            phase,
            kickoff: event.time,
            home_logo: event.home_logo,
            away_logo: event.away_logo,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_from_status() {
        assert_eq!(MatchPhase::from_status("1H"), MatchPhase::Live);
        assert_eq!(MatchPhase::from_status("2H"), MatchPhase::Live);
        assert_eq!(MatchPhase::from_status("HT"), MatchPhase::HalfTime);
        assert_eq!(MatchPhase::from_status("FT"), MatchPhase::Finished);
        assert_eq!(MatchPhase::from_status("Match Finished"), MatchPhase::Finished);
        assert_eq!(MatchPhase::from_status("NS"), MatchPhase::Other);
        assert_eq!(MatchPhase::from_status(""), MatchPhase::Other);
    }

    #[test]
    fn test_phase_ordering() {
        assert!(MatchPhase::Live < MatchPhase::HalfTime);
        assert!(MatchPhase::HalfTime < MatchPhase::Finished);
        assert!(MatchPhase::Finished < MatchPhase::Other);
    }

    #[test]
    fn test_final_score_requires_finished() {
        let mut event = MatchEvent {
            id: "1".into(),
            home_team: "Arsenal".into(),
            away_team: "Chelsea".into(),
            home_score: Some(2),
            away_score: Some(1),
            status: "2H".into(),
            league: "English Premier League".into(),
            date: None,
            time: None,
            home_logo: None,
            away_logo: None,
        };
        assert_eq!(event.final_score(), None);
        event.status = "FT".into();
        assert_eq!(event.final_score(), Some((2, 1)));
        event.away_score = None;
        assert_eq!(event.final_score(), None);
    }
}
