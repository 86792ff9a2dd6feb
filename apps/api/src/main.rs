mod config;
mod db;
mod domain;
mod embedding;
mod errors;
mod extract;
mod index;
mod jobs;
mod llm;
mod models;
mod pipeline;
mod repo;
mod routes;
mod search;
mod state;
mod textract;
mod vector;

use std::collections::HashSet;
use std::process::ExitCode;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::embedding::EmbeddingClient;
use crate::jobs::cache::JobCache;
use crate::llm::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;

// Exit codes: 0 success, 1 configuration error, 2 unreachable collaborator,
// 3 unrecoverable pipeline error.
const EXIT_CONFIG: u8 = 1;
const EXIT_COLLABORATOR: u8 = 2;
const EXIT_PIPELINE: u8 = 3;

#[tokio::main]
async fn main() -> ExitCode {
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("configuration error: {e:#}");
            return ExitCode::from(EXIT_CONFIG);
        }
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            let crate_name = env!("CARGO_PKG_NAME").replace('-', "_");
            EnvFilter::new(format!("{crate_name}={}", &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting ATS API v{}", env!("CARGO_PKG_VERSION"));

    let db = match create_pool(&config).await {
        Ok(pool) => pool,
        Err(e) => {
            error!("database unreachable: {e:#}");
            return ExitCode::from(EXIT_COLLABORATOR);
        }
    };

    let llm = LlmClient::new(config.ollama_host.clone(), config.llm_model.clone());
    info!("LLM client initialized (host: {})", config.ollama_host);

    let embedder = EmbeddingClient::new(
        config.ollama_host.clone(),
        config.embedding_model.clone(),
        config.embedding_fallback_model.clone(),
        config.embedding_dimension,
        config.chunk_size,
        config.chunk_overlap,
        config.embedding_batch_size,
    );

    let vectors = match vector::build_store(&config) {
        Ok(store) => store,
        Err(e) => {
            error!("vector backend configuration error: {e:#}");
            return ExitCode::from(EXIT_CONFIG);
        }
    };
    info!("vector backend initialized ({})", config.vector_backend);

    let state = AppState {
        db,
        llm,
        embedder,
        vectors,
        job_cache: Arc::new(JobCache::new(config.job_cache_capacity)),
        in_flight: Arc::new(Mutex::new(HashSet::new())),
        config: config.clone(),
    };

    let app = build_router(state.clone())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = format!("0.0.0.0:{}", config.port);
    info!("Listening on {addr}");

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("failed to bind {addr}: {e}");
            return ExitCode::from(EXIT_CONFIG);
        }
    };

    let serve_result = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    // Drain grace period, then mark anything still in flight.
    info!(
        grace_secs = config.shutdown_grace_secs,
        "shutting down, draining in-flight work"
    );
    tokio::time::sleep(Duration::from_secs(config.shutdown_grace_secs)).await;
    pipeline::fail_survivors(&state).await;

    match serve_result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("server error: {e}");
            ExitCode::from(EXIT_PIPELINE)
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("failed to install shutdown handler: {e}");
    }
    info!("shutdown signal received");
}
