mod config;
mod errors;
mod llm_client;
mod matching;
mod models;
mod resume;
mod routes;
mod state;
mod store;

use anyhow::{Context, Result};
use axum::extract::DefaultBodyLimit;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::matching::coordinator::MatchCoordinator;
use crate::matching::orchestrator::BatchOrchestrator;
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::{KvStore, MemoryStore, RedisStore, SessionStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting jobrank v{}", env!("CARGO_PKG_VERSION"));

    // Initialize the persistent store
    let kv: Arc<dyn KvStore> = match &config.redis_url {
        Some(url) => {
            let store = RedisStore::connect(url, &config.store_prefix)
                .await
                .context("Failed to connect to Redis")?;
            info!("Redis store initialized (prefix: {})", config.store_prefix);
            Arc::new(store)
        }
        None => {
            warn!("REDIS_URL not set; session state will not survive a restart");
            Arc::new(MemoryStore::default())
        }
    };

    // Initialize the scoring oracle
    let llm = LlmClient::new(config.oracle_settings()).context("Failed to build LLM client")?;
    info!("LLM client initialized (model: {})", llm.model());

    let orchestrator = BatchOrchestrator::new(Arc::new(llm), config.match_settings());
    info!(
        "Matching: batch size {}, batch delay {}ms, display batch {}",
        config.match_batch_size, config.match_batch_delay_ms, config.display_batch_size
    );

    // Restore the session written by a previous process
    let coordinator = MatchCoordinator::restore(orchestrator.clone(), SessionStore::new(kv))
        .await
        .context("Failed to restore session from store")?;

    let state = AppState {
        coordinator: Arc::new(coordinator),
        orchestrator,
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
