use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Returns service status plus a summary of the session.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "jobrank",
        "resumeLoaded": state.coordinator.resume().is_some(),
        "jobs": state.coordinator.job_count(),
        "matchingInProgress": state.coordinator.is_matching()
    }))
}
