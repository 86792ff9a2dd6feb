pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::index::handlers as idx;
use crate::pipeline::handlers as ingest;
use crate::search;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/upload-resume", post(ingest::handle_upload_resume))
        .route("/index-pinecone", post(idx::handle_index))
        .route("/reindex-resumes", post(idx::handle_reindex))
        .route("/ai-search", post(search::handle_ai_search))
        .with_state(state)
}
