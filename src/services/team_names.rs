//! Team name normalization.
//!
//! Collapses common naming variants ("Man Utd", "man united") onto one
//! canonical name so fixture dedup and result matching key correctly.

use std::collections::HashMap;
use std::sync::OnceLock;

/// Alias (lowercase) -> canonical name.
const ALIASES: &[(&str, &str)] = &[
    // England
    ("man utd", "Manchester United"),
    ("man united", "Manchester United"),
    ("manchester utd", "Manchester United"),
    ("manchester united", "Manchester United"),
    ("mufc", "Manchester United"),
    ("man city", "Manchester City"),
    ("manchester city", "Manchester City"),
    ("mcfc", "Manchester City"),
    ("arsenal", "Arsenal"),
    ("arsenal fc", "Arsenal"),
    ("the gunners", "Arsenal"),
    ("chelsea", "Chelsea"),
    ("chelsea fc", "Chelsea"),
    ("liverpool", "Liverpool"),
    ("liverpool fc", "Liverpool"),
    ("lfc", "Liverpool"),
    ("spurs", "Tottenham Hotspur"),
    ("tottenham", "Tottenham Hotspur"),
    ("tottenham hotspur", "Tottenham Hotspur"),
    ("newcastle", "Newcastle United"),
    ("newcastle utd", "Newcastle United"),
    ("newcastle united", "Newcastle United"),
    ("west ham", "West Ham United"),
    ("west ham utd", "West Ham United"),
    ("west ham united", "West Ham United"),
    ("villa", "Aston Villa"),
    ("aston villa", "Aston Villa"),
    ("wolves", "Wolverhampton Wanderers"),
    ("wolverhampton", "Wolverhampton Wanderers"),
    ("wolverhampton wanderers", "Wolverhampton Wanderers"),
    ("brighton", "Brighton and Hove Albion"),
    ("brighton & hove albion", "Brighton and Hove Albion"),
    ("brighton and hove albion", "Brighton and Hove Albion"),
    ("palace", "Crystal Palace"),
    ("crystal palace", "Crystal Palace"),
    ("forest", "Nottingham Forest"),
    ("nottm forest", "Nottingham Forest"),
    ("nottingham forest", "Nottingham Forest"),
    ("leicester", "Leicester City"),
    ("leicester city", "Leicester City"),
    ("everton", "Everton"),
    ("fulham", "Fulham"),
    ("brentford", "Brentford"),
    ("bournemouth", "AFC Bournemouth"),
    ("afc bournemouth", "AFC Bournemouth"),
    ("leeds", "Leeds United"),
    ("leeds utd", "Leeds United"),
    ("leeds united", "Leeds United"),
    ("sheffield utd", "Sheffield United"),
    ("sheffield united", "Sheffield United"),
    ("ipswich", "Ipswich Town"),
    ("ipswich town", "Ipswich Town"),
    ("southampton", "Southampton"),
    ("burnley", "Burnley"),
    ("sunderland", "Sunderland"),
    // Spain
    ("real madrid", "Real Madrid"),
    ("real madrid cf", "Real Madrid"),
    ("barca", "Barcelona"),
    ("barça", "Barcelona"),
    ("barcelona", "Barcelona"),
    ("fc barcelona", "Barcelona"),
    ("atletico", "Atletico Madrid"),
    ("atletico madrid", "Atletico Madrid"),
    ("atlético madrid", "Atletico Madrid"),
    ("atleti", "Atletico Madrid"),
    ("sevilla", "Sevilla"),
    ("real sociedad", "Real Sociedad"),
    ("villarreal", "Villarreal"),
    ("real betis", "Real Betis"),
    ("betis", "Real Betis"),
    ("athletic bilbao", "Athletic Bilbao"),
    ("athletic club", "Athletic Bilbao"),
    // Italy
    ("juve", "Juventus"),
    ("juventus", "Juventus"),
    ("inter", "Inter Milan"),
    ("inter milan", "Inter Milan"),
    ("internazionale", "Inter Milan"),
    ("ac milan", "AC Milan"),
    ("milan", "AC Milan"),
    ("napoli", "Napoli"),
    ("ssc napoli", "Napoli"),
    ("roma", "Roma"),
    ("as roma", "Roma"),
    ("lazio", "Lazio"),
    ("atalanta", "Atalanta"),
    // Germany
    ("bayern", "Bayern Munich"),
    ("bayern munich", "Bayern Munich"),
    ("bayern münchen", "Bayern Munich"),
    ("fc bayern", "Bayern Munich"),
    ("dortmund", "Borussia Dortmund"),
    ("bvb", "Borussia Dortmund"),
    ("borussia dortmund", "Borussia Dortmund"),
    ("leverkusen", "Bayer Leverkusen"),
    ("bayer leverkusen", "Bayer Leverkusen"),
    ("leipzig", "RB Leipzig"),
    ("rb leipzig", "RB Leipzig"),
    ("gladbach", "Borussia Monchengladbach"),
    ("borussia monchengladbach", "Borussia Monchengladbach"),
    // France
    ("psg", "Paris Saint-Germain"),
    ("paris sg", "Paris Saint-Germain"),
    ("paris saint germain", "Paris Saint-Germain"),
    ("paris saint-germain", "Paris Saint-Germain"),
    ("marseille", "Marseille"),
    ("om", "Marseille"),
    ("olympique marseille", "Marseille"),
    ("lyon", "Lyon"),
    ("ol", "Lyon"),
    ("olympique lyonnais", "Lyon"),
    ("monaco", "Monaco"),
    ("as monaco", "Monaco"),
    ("lille", "Lille"),
    // Elsewhere
    ("ajax", "Ajax"),
    ("psv", "PSV Eindhoven"),
    ("psv eindhoven", "PSV Eindhoven"),
    ("benfica", "Benfica"),
    ("sl benfica", "Benfica"),
    ("porto", "Porto"),
    ("fc porto", "Porto"),
    ("sporting", "Sporting CP"),
    ("sporting cp", "Sporting CP"),
    ("sporting lisbon", "Sporting CP"),
    ("celtic", "Celtic"),
    ("rangers", "Rangers"),
    ("galatasaray", "Galatasaray"),
    // National teams
    ("usa", "United States"),
    ("usmnt", "United States"),
    ("uswnt", "United States"),
    ("united states", "United States"),
    ("england", "England"),
    ("three lions", "England"),
    ("lionesses", "England"),
    ("holland", "Netherlands"),
    ("netherlands", "Netherlands"),
    ("korea republic", "South Korea"),
    ("south korea", "South Korea"),
    ("ivory coast", "Ivory Coast"),
    ("cote d'ivoire", "Ivory Coast"),
    ("côte d'ivoire", "Ivory Coast"),
];

static ALIAS_TABLE: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();

fn alias_table() -> &'static HashMap<&'static str, &'static str> {
    ALIAS_TABLE.get_or_init(|| ALIASES.iter().copied().collect())
}

/// Canonical name for a free-text team name.
///
/// Lookup is case-insensitive and ignores surrounding and repeated
/// whitespace. Unknown names come back trimmed but otherwise unchanged.
pub fn normalize_team_name(raw: &str) -> String {
    let trimmed = raw.trim();
    let key = trimmed
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();

    match alias_table().get(key.as_str()) {
        Some(canonical) => (*canonical).to_string(),
        None => trimmed.to_string(),
    }
}

/// Whether two raw names refer to the same team after normalization.
pub fn same_team(a: &str, b: &str) -> bool {
    normalize_team_name(a).to_lowercase() == normalize_team_name(b).to_lowercase()
}
