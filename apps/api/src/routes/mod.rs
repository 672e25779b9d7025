pub mod health;

use axum::{
    routing::{delete, get, post, put},
    Router,
};

use crate::matching::handlers as matching;
use crate::resume::handlers as resume;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Resume
        .route("/upload-resume", post(resume::handle_upload_resume))
        // Job set, fed by the page extraction agent
        .route(
            "/jobs",
            put(matching::handle_set_jobs).delete(matching::handle_clear_jobs),
        )
        // Rankings
        .route("/rankings", get(matching::handle_current_rankings))
        .route("/rankings/start", post(matching::handle_start_matching))
        .route("/rankings/more", post(matching::handle_reveal_more))
        .route("/session", delete(matching::handle_reset_session))
        // Stateless one-shot ranking
        .route("/match-jobs", post(matching::handle_match_jobs))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config;
    use crate::matching::coordinator::MatchCoordinator;
    use crate::matching::handlers::RankingResponse;
    use crate::matching::orchestrator::tests::ScriptedOracle;
    use crate::matching::orchestrator::BatchOrchestrator;
    use crate::resume::handlers::UploadResumeResponse;
    use crate::store::{MemoryStore, SessionStore};
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use base64::{engine::general_purpose, Engine as _};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use std::time::Duration;
    use tower::ServiceExt;

    async fn app() -> Router {
        let config = test_config();
        let oracle = ScriptedOracle::new(
            &[("alpha", 0.4), ("beta", 0.9), ("gamma", 0.6)],
            Duration::ZERO,
        );
        let orchestrator = BatchOrchestrator::new(oracle, config.match_settings());
        let store = SessionStore::new(Arc::new(MemoryStore::default()));
        let coordinator = MatchCoordinator::restore(orchestrator.clone(), store)
            .await
            .unwrap();
        build_router(AppState {
            coordinator: Arc::new(coordinator),
            orchestrator,
            config,
        })
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    fn jobs_body() -> Value {
        json!({
            "jobs": [
                {"id": "alpha", "title": "alpha", "description": "Rust backend role"},
                {"id": "beta", "title": "beta", "description": "Rust platform role"},
                {"id": "gamma", "title": "gamma", "description": "Rust tooling role"}
            ]
        })
    }

    async fn upload(app: &Router) -> (StatusCode, Value) {
        let encoded = general_purpose::STANDARD
            .encode("Senior Rust engineer. Rust, tokio, postgres, kubernetes.");
        send(
            app,
            "POST",
            "/upload-resume",
            Some(json!({
                "resumeData": format!("data:text/plain;base64,{encoded}"),
                "spokenLanguages": ["en"]
            })),
        )
        .await
    }

    #[tokio::test]
    async fn test_health_reports_session_summary() {
        let app = app().await;
        let (status, body) = send(&app, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["resumeLoaded"], false);
        assert_eq!(body["jobs"], 0);
    }

    #[tokio::test]
    async fn test_upload_resume_returns_processed_resume() {
        let app = app().await;
        let (status, body) = upload(&app).await;
        assert_eq!(status, StatusCode::OK);

        let response: UploadResumeResponse = serde_json::from_value(body).unwrap();
        assert!(response.success);
        assert!(response.processed_resume.text.starts_with("Senior Rust engineer"));
        assert_eq!(response.processed_resume.keywords[0].term, "rust");
        assert!(response.processed_resume.tokens.contains(&"kubernetes".to_string()));
    }

    #[tokio::test]
    async fn test_upload_rejects_empty_payload() {
        let app = app().await;
        let (status, body) = send(&app, "POST", "/upload-resume", Some(json!({"resumeData": ""}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_start_without_resume_is_bad_request() {
        let app = app().await;
        send(&app, "PUT", "/jobs", Some(jobs_body())).await;
        let (status, body) = send(&app, "POST", "/rankings/start", Some(json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "NO_RESUME");
    }

    #[tokio::test]
    async fn test_full_session_flow() {
        let app = app().await;
        assert_eq!(upload(&app).await.0, StatusCode::OK);

        let (status, body) = send(&app, "PUT", "/jobs", Some(jobs_body())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 3);

        let (status, body) = send(
            &app,
            "POST",
            "/rankings/start",
            Some(json!({"displayBatchSize": 2})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let first: RankingResponse = serde_json::from_value(body).unwrap();
        let ids: Vec<&str> = first.rankings.iter().map(|r| r.job.id.as_str()).collect();
        assert_eq!(ids, vec!["beta", "gamma"]);
        assert!(first.pagination.has_more);

        let (_, body) = send(&app, "POST", "/rankings/more", Some(json!({"pageSize": 2}))).await;
        let more: RankingResponse = serde_json::from_value(body).unwrap();
        assert_eq!(more.rankings.len(), 1);
        assert_eq!(more.rankings[0].job.id, "alpha");
        assert!(!more.pagination.has_more);

        let (_, body) = send(&app, "GET", "/rankings", None).await;
        assert_eq!(body["rankings"].as_array().unwrap().len(), 3);
        assert_eq!(body["rankings"][0]["matchPercentage"], "90%");

        let (status, _) = send(&app, "DELETE", "/jobs", None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (_, body) = send(&app, "GET", "/rankings", None).await;
        assert!(body["rankings"].as_array().unwrap().is_empty());

        let (status, _) = send(&app, "DELETE", "/session", None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (_, body) = send(&app, "GET", "/health", None).await;
        assert_eq!(body["resumeLoaded"], false);
    }

    #[tokio::test]
    async fn test_malformed_start_body_is_rejected_but_empty_body_uses_defaults() {
        let app = app().await;
        assert_eq!(upload(&app).await.0, StatusCode::OK);
        send(&app, "PUT", "/jobs", Some(jobs_body())).await;

        let (status, body) = send(
            &app,
            "POST",
            "/rankings/start",
            Some(json!({"displayBatchSize": "ten"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

        let (status, body) = send(&app, "POST", "/rankings/start", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["pagination"]["limit"], 10);
        assert_eq!(body["rankings"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_zero_page_size_is_rejected() {
        let app = app().await;
        let (status, _) = send(&app, "POST", "/rankings/more", Some(json!({"pageSize": 0}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_duplicate_job_ids_are_rejected() {
        let app = app().await;
        let (status, body) = send(
            &app,
            "PUT",
            "/jobs",
            Some(json!({"jobs": [{"id": "a"}, {"id": "a"}]})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_match_jobs_is_stateless_and_paginated() {
        let app = app().await;
        let mut body = jobs_body();
        body["resumeText"] = json!("Rust engineer");
        body["requiredLanguages"] = json!(["en"]);
        body["start"] = json!(1);
        body["limit"] = json!(1);

        let (status, body) = send(&app, "POST", "/match-jobs", Some(body)).await;
        assert_eq!(status, StatusCode::OK);
        let page: RankingResponse = serde_json::from_value(body).unwrap();
        assert_eq!(page.rankings.len(), 1);
        assert_eq!(page.rankings[0].job.id, "gamma");
        assert_eq!(page.pagination.total, 3);
        assert!(page.pagination.has_more);

        let (_, health) = send(&app, "GET", "/health", None).await;
        assert_eq!(health["jobs"], 0);
    }
}
