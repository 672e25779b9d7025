use std::sync::Arc;

use crate::config::Config;
use crate::matching::coordinator::MatchCoordinator;
use crate::matching::orchestrator::BatchOrchestrator;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Owner of the single user session.
    pub coordinator: Arc<MatchCoordinator>,
    /// Used directly by the stateless `/match-jobs` route.
    pub orchestrator: BatchOrchestrator,
    pub config: Config,
}
