use chrono::NaiveDate;

use crate::models::match_event::{LiveMatch, MatchEvent};
use crate::services::sports_db::{SportsData, SportsDataError};

/// Maximum rows shown in the live scores sidebar.
pub const LIVE_SCORES_LIMIT: usize = 15;

/// Today's fixtures from allow-listed leagues, most interesting first.
pub async fn fetch_live_scores(
    source: &dyn SportsData,
    leagues: &[String],
    today: NaiveDate,
) -> Result<Vec<LiveMatch>, SportsDataError> {
    let events = source.events_on(today).await?;
    let matches = select_live_matches(events, leagues, LIVE_SCORES_LIMIT);

    tracing::debug!(date = %today, count = matches.len(), "Live scores fetched");
    Ok(matches)
}

/// Filter to the allow-list, order by phase (live, half-time, finished,
/// other), then league name, then kickoff time, and cap at `limit`.
pub fn select_live_matches(
    events: Vec<MatchEvent>,
    leagues: &[String],
    limit: usize,
) -> Vec<LiveMatch> {
    let mut matches: Vec<LiveMatch> = events
        .into_iter()
        .filter(|e| leagues.iter().any(|l| l.eq_ignore_ascii_case(e.league.trim())))
        .map(LiveMatch::from)
        .collect();

    matches.sort_by(|a, b| {
        a.phase
            .cmp(&b.phase)
            .then_with(|| a.league.cmp(&b.league))
            .then_with(|| a.kickoff.cmp(&b.kickoff))
    });
    matches.truncate(limit);
    matches
}
