use sqlx::PgPool;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use crate::config::Config;
use crate::embedding::EmbeddingClient;
use crate::jobs::cache::JobCache;
use crate::llm::LlmClient;
use crate::vector::VectorStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub llm: LlmClient,
    pub embedder: EmbeddingClient,
    pub vectors: Arc<dyn VectorStore>,
    pub job_cache: Arc<JobCache>,
    /// Resume ids currently inside the extraction pipeline; shutdown marks
    /// survivors "failed:shutdown" after the grace period.
    pub in_flight: Arc<Mutex<HashSet<i64>>>,
    pub config: Config,
}
