use garde::Validate;
use serde::{Deserialize, Serialize};

/// Structured prediction returned by the model, stored as the job's
/// `resultPayload` once generation succeeds.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MatchPrediction {
    #[garde(length(min = 1, max = 300))]
    pub prediction: String,

    #[garde(length(min = 1, max = 50))]
    pub confidence: String,

    #[garde(custom(is_percentage))]
    pub team_a_win_probability: String,

    #[garde(custom(is_percentage))]
    pub draw_probability: String,

    #[garde(custom(is_percentage))]
    pub team_b_win_probability: String,

    #[garde(length(min = 1))]
    pub analysis: String,

    #[garde(skip)]
    #[serde(default)]
    pub recent_form: TeamPair<String>,

    #[garde(skip)]
    #[serde(default)]
    pub head_to_head: HeadToHead,

    #[garde(dive)]
    #[serde(default)]
    pub best_bets: Vec<BestBet>,

    #[garde(skip)]
    #[serde(default)]
    pub availability: TeamPair<String>,

    #[garde(skip)]
    #[serde(default)]
    pub venue: String,

    #[garde(skip)]
    #[serde(default)]
    pub kickoff: String,

    #[garde(skip)]
    #[serde(default)]
    pub referee: String,

    #[garde(skip)]
    #[serde(default)]
    pub league_context: String,

    #[garde(skip)]
    #[serde(default)]
    pub player_stats: Vec<PlayerStat>,

    #[garde(skip)]
    #[serde(default)]
    pub goal_scorers: Vec<GoalScorer>,

    #[garde(skip)]
    #[serde(default)]
    pub goal_count_probabilities: GoalCountProbabilities,

    #[garde(skip)]
    #[serde(default)]
    pub both_teams_to_score: YesNo,

    #[garde(skip)]
    #[serde(default)]
    pub over_under_25: OverUnder,

    /// Set by the worker from the prediction text; drives resolution.
    #[garde(skip)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pick: Option<Pick>,

    /// Citations attached from the model's search grounding.
    #[garde(skip)]
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<Source>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamPair<T> {
    #[serde(default)]
    pub team_a: T,
    #[serde(default)]
    pub team_b: T,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeadToHead {
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub team_a_wins: u32,
    #[serde(default)]
    pub draws: u32,
    #[serde(default)]
    pub team_b_wins: u32,
    #[serde(default)]
    pub last_meetings: Vec<PastMeeting>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PastMeeting {
    pub date: String,
    pub score: String,
    #[serde(default)]
    pub competition: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BestBet {
    #[garde(length(min = 1))]
    pub category: String,
    #[garde(length(min = 1))]
    pub value: String,
    #[garde(skip)]
    pub confidence: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStat {
    pub player: String,
    pub team: String,
    #[serde(default)]
    pub position: String,
    #[serde(default)]
    pub goals: u32,
    #[serde(default)]
    pub assists: u32,
    #[serde(default)]
    pub appearances: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalScorer {
    pub player: String,
    pub team: String,
    pub probability: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalCountProbabilities {
    #[serde(default)]
    pub zero: String,
    #[serde(default)]
    pub one_to_two: String,
    #[serde(default)]
    pub three_plus: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct YesNo {
    #[serde(default)]
    pub yes: String,
    #[serde(default)]
    pub no: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OverUnder {
    #[serde(default)]
    pub over: String,
    #[serde(default)]
    pub under: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Source {
    pub title: String,
    pub uri: String,
}

/// Structured form of the headline prediction, resolved exactly against a
/// final score.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Pick {
    TeamWin { team: String },
    Draw,
    Over { line: f64 },
    Under { line: f64 },
}

/// Accepts strings such as "45%" or "45.5 %" in the 0..=100 range.
fn is_percentage(value: &str, _ctx: &()) -> garde::Result {
    let number = value.trim().trim_end_matches('%').trim();
    match number.parse::<f64>() {
        Ok(p) if (0.0..=100.0).contains(&p) => Ok(()),
        _ => Err(garde::Error::new(format!("'{}' is not a percentage", value))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal() -> serde_json::Value {
        serde_json::json!({
            "prediction": "Arsenal to Win",
            "confidence": "High",
            "teamAWinProbability": "55%",
            "drawProbability": "25%",
            "teamBWinProbability": "20%",
            "analysis": "Arsenal are unbeaten at home.",
            "bestBets": [{"category": "Result", "value": "Arsenal", "confidence": "High"}]
        })
    }

    #[test]
    fn test_minimal_payload_is_valid() {
        let parsed: MatchPrediction = serde_json::from_value(minimal()).unwrap();
        assert!(parsed.validate().is_ok());
        assert!(parsed.pick.is_none());
        assert_eq!(parsed.best_bets.len(), 1);
    }

    #[test]
    fn test_bad_probability_is_rejected() {
        let mut value = minimal();
        value["drawProbability"] = serde_json::json!("likely");
        let parsed: MatchPrediction = serde_json::from_value(value).unwrap();
        assert!(parsed.validate().is_err());
    }

    #[test]
    fn test_empty_prediction_is_rejected() {
        let mut value = minimal();
        value["prediction"] = serde_json::json!("");
        let parsed: MatchPrediction = serde_json::from_value(value).unwrap();
        assert!(parsed.validate().is_err());
    }

    #[test]
    fn test_pick_serialization() {
        let pick = Pick::Over { line: 2.5 };
        assert_eq!(
            serde_json::to_value(&pick).unwrap(),
            serde_json::json!({"kind": "over", "line": 2.5})
        );
    }
}
