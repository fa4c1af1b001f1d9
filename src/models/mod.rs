pub mod api;
pub mod job;
pub mod match_event;
pub mod prediction;
