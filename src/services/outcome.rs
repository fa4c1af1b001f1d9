//! Turning a headline prediction into a [`Pick`] and settling it against a
//! final score.

use crate::models::job::JobStatus;
use crate::models::match_event::MatchEvent;
use crate::models::prediction::Pick;
use crate::services::team_names::{normalize_team_name, same_team};

/// Settled result of a pick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Won,
    Lost,
}

impl From<Outcome> for JobStatus {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Won => JobStatus::Won,
            Outcome::Lost => JobStatus::Lost,
        }
    }
}

/// Derive a pick from prediction text such as "Arsenal to Win", "Draw" or
/// "Over 2.5 Goals".
///
/// Checked in order: a named team plus "win", then "draw", then an
/// over/under line. Returns `None` when none of them applies.
pub fn parse_pick(prediction: &str, team_a: &str, team_b: &str) -> Option<Pick> {
    let text = prediction.to_lowercase();

    if contains_word(&text, "win") || contains_word(&text, "wins") {
        if let Some(team) = first_named_team(&text, team_a, team_b) {
            return Some(Pick::TeamWin { team });
        }
    }

    if contains_word(&text, "draw") {
        return Some(Pick::Draw);
    }

    parse_total_line(&text)
}

/// Settle a pick against a finished event. `None` when the event has no final
/// score or the picked team did not play in it.
pub fn settle(pick: &Pick, event: &MatchEvent) -> Option<Outcome> {
    let (home, away) = event.final_score()?;

    let won = match pick {
        Pick::TeamWin { team } => {
            if same_team(team, &event.home_team) {
                home > away
            } else if same_team(team, &event.away_team) {
                away > home
            } else {
                return None;
            }
        }
        Pick::Draw => home == away,
        Pick::Over { line } => f64::from(home + away) > *line,
        Pick::Under { line } => f64::from(home + away) < *line,
    };

    Some(if won { Outcome::Won } else { Outcome::Lost })
}

fn contains_word(text: &str, word: &str) -> bool {
    text.split(|c: char| !c.is_alphanumeric())
        .any(|token| token == word)
}

/// The job team whose name appears earliest in the text.
fn first_named_team(text: &str, team_a: &str, team_b: &str) -> Option<String> {
    let position = |team: &str| -> Option<usize> {
        let canonical = normalize_team_name(team).to_lowercase();
        let raw = team.trim().to_lowercase();
        [canonical, raw]
            .iter()
            .filter(|name| !name.is_empty())
            .filter_map(|name| text.find(name.as_str()))
            .min()
    };

    match (position(team_a), position(team_b)) {
        (Some(a), Some(b)) if b < a => Some(team_b.to_string()),
        (Some(_), _) => Some(team_a.to_string()),
        (None, Some(_)) => Some(team_b.to_string()),
        (None, None) => None,
    }
}

/// "over 2.5", "under 3.5 goals", "over2.5".
fn parse_total_line(text: &str) -> Option<Pick> {
    let tokens: Vec<&str> = text
        .split(|c: char| c.is_whitespace() || c == '(' || c == ')' || c == ',')
        .filter(|t| !t.is_empty())
        .collect();

    for (i, token) in tokens.iter().enumerate() {
        for (keyword, over) in [("over", true), ("under", false)] {
            let Some(rest) = token.strip_prefix(keyword) else {
                continue;
            };
            let number = if rest.is_empty() {
                tokens.get(i + 1).copied().unwrap_or_default()
            } else {
                rest
            };
            let number = number.trim_matches(|c: char| !c.is_ascii_digit() && c != '.');
            if let Ok(line) = number.parse::<f64>() {
                return Some(if over {
                    Pick::Over { line }
                } else {
                    Pick::Under { line }
                });
            }
        }
    }

    None
}
