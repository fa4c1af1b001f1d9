//! Match Predictor
//!
//! AI-generated football match predictions. Requests for the same fixture are
//! deduplicated into one job, generated asynchronously by a queue worker with
//! Gemini, and later settled as won or lost against real results from
//! TheSportsDB.

pub mod app_state;
pub mod client;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod poller;
pub mod routes;
pub mod services;
pub mod telemetry;
