//! Axum route handlers for the indexing endpoints.

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use tracing::info;

use crate::errors::AppError;
use crate::index::{IndexReport, IndexingService};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct IndexParams {
    pub limit: Option<i64>,
    /// Comma-separated resume ids, e.g. `resume_ids=1,2,3`.
    pub resume_ids: Option<String>,
    #[serde(default)]
    pub force: bool,
}

fn parse_ids(raw: Option<&str>) -> Result<Option<Vec<i64>>, AppError> {
    let Some(raw) = raw else { return Ok(None) };
    let ids: Result<Vec<i64>, _> = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::parse)
        .collect();
    match ids {
        Ok(ids) if ids.is_empty() => Ok(None),
        Ok(ids) => Ok(Some(ids)),
        Err(_) => Err(AppError::Validation(
            "resume_ids must be a comma-separated list of integers".to_string(),
        )),
    }
}

fn service(state: &AppState) -> IndexingService {
    IndexingService::new(
        state.db.clone(),
        state.embedder.clone(),
        state.vectors.clone(),
    )
}

/// POST /index-pinecone
///
/// Drives the vector indexer across rows with indexed_flag = 0. The flag is
/// set to 1 only after durable storage.
pub async fn handle_index(
    State(state): State<AppState>,
    Query(params): Query<IndexParams>,
) -> Result<Json<IndexReport>, AppError> {
    let ids = parse_ids(params.resume_ids.as_deref())?;
    let report = service(&state)
        .index_resumes(params.limit, ids.as_deref(), params.force)
        .await
        .map_err(AppError::Internal)?;
    Ok(Json(report))
}

/// POST /reindex-resumes
///
/// Force-reindexes resumes regardless of their indexed flag; used after a
/// skill-normalization rule change so stored vectors pick up the new
/// canonical forms. The prior vector set per resume is fully replaced.
pub async fn handle_reindex(
    State(state): State<AppState>,
    Query(params): Query<IndexParams>,
) -> Result<Json<IndexReport>, AppError> {
    let ids = parse_ids(params.resume_ids.as_deref())?;
    let mut report = service(&state)
        .index_resumes(params.limit, ids.as_deref(), true)
        .await
        .map_err(AppError::Internal)?;

    report.message = report.message.replace("Indexed", "Re-indexed") + " with skill normalization";
    info!(
        indexed_count = report.indexed_count,
        failed_count = report.failed_count,
        "re-indexing completed"
    );
    Ok(Json(report))
}
