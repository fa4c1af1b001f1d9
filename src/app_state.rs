use std::sync::Arc;

use crate::db::store::PredictionStore;
use crate::services::{queue::GenerationQueue, sports_db::SportsData};

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn PredictionStore>,
    pub queue: Arc<dyn GenerationQueue>,
    pub sports: Arc<dyn SportsData>,
    /// Leagues shown in the live scores sidebar.
    pub leagues: Arc<Vec<String>>,
}

impl AppState {
    pub fn new(
        store: impl PredictionStore + 'static,
        queue: impl GenerationQueue + 'static,
        sports: impl SportsData + 'static,
        leagues: Vec<String>,
    ) -> Self {
        Self {
            store: Arc::new(store),
            queue: Arc::new(queue),
            sports: Arc::new(sports),
            leagues: Arc::new(leagues),
        }
    }
}
