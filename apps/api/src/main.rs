mod config;
mod db;
mod errors;
mod interview;
mod llm_client;
mod routes;
mod sessions;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::Utc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{Config, StoreBackend};
use crate::db::create_pool;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::sessions::file_store::JsonFileStore;
use crate::sessions::pg_store::PgSessionStore;
use crate::sessions::repository::SessionRepository;
use crate::sessions::store::{MemoryStore, SessionStore};
use crate::state::AppState;

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

    info!("Starting MockView API v{}", env!("CARGO_PKG_VERSION"));

    // A broken prompt template is a build defect, not a per-request failure
    interview::prompts::validate_templates()?;

    // Open the session store
    let store = open_store(&config.store).await?;
    let sessions = SessionRepository::new(store, Utc::now());

    // Initialize LLM client
    let llm = LlmClient::new(
        config.anthropic_api_key.clone(),
        Duration::from_secs(config.llm_timeout_secs),
        config.llm_max_attempts,
    )?;
    info!(
        "LLM client initialized (model: {}, timeout: {}s, attempts: {})",
        llm_client::MODEL,
        config.llm_timeout_secs,
        config.llm_max_attempts
    );

    let state = AppState {
        llm: Arc::new(llm),
        sessions: sessions.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutting down, closing session store");
    sessions.close().await?;

    Ok(())
}

async fn open_store(backend: &StoreBackend) -> Result<Arc<dyn SessionStore>> {
    let store: Arc<dyn SessionStore> = match backend {
        StoreBackend::File { dir } => Arc::new(JsonFileStore::open(dir.clone()).await?),
        StoreBackend::Postgres { database_url } => {
            Arc::new(PgSessionStore::open(create_pool(database_url).await?).await?)
        }
        StoreBackend::Memory => {
            warn!("Using in-memory session store; sessions are lost on restart");
            Arc::new(MemoryStore::new())
        }
    };
    Ok(store)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Could not listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
}
