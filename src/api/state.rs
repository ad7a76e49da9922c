use std::sync::Arc;

use crate::db::{InMemoryRepository, Repository};
use crate::services::{ClusterParams, Recommender};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<dyn Repository>,
    pub recommender: Arc<Recommender>,
    /// Recommendation count used when a request gives no `limit`
    pub default_recommendations: usize,
}

impl Default for AppState {
    fn default() -> Self {
        Self::in_memory(ClusterParams::default())
    }
}

impl AppState {
    pub fn new(
        repo: Arc<dyn Repository>,
        recommender: Recommender,
        default_recommendations: usize,
    ) -> Self {
        Self {
            repo,
            recommender: Arc::new(recommender),
            default_recommendations,
        }
    }

    /// State over an empty in-memory repository
    pub fn in_memory(params: ClusterParams) -> Self {
        Self::new(
            Arc::new(InMemoryRepository::new()),
            Recommender::new(params),
            5,
        )
    }
}
