pub mod dispatcher;
pub mod gemini;
pub mod generation;
pub mod live_scores;
pub mod outcome;
pub mod queue;
pub mod sports_db;
pub mod sync;
pub mod team_names;
