//! AI search over the vector store — the thin consumption side of the
//! ingestion pipeline. Embeds the query (through the job cache), routes to
//! the index by master-category (both when unset), and queries the category
//! namespace. Ranking-quality features (fit tiers, query parsing) live in
//! the matching layer, not here.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::errors::AppError;
use crate::jobs::cache::JobEntry;
use crate::models::resume::MasterCategory;
use crate::state::AppState;
use crate::vector::{namespace_for, IndexName, QueryMatch};

#[derive(Debug, Deserialize)]
pub struct AiSearchRequest {
    pub query: String,
    pub mastercategory: Option<String>,
    pub category: Option<String>,
    pub top_k: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct AiSearchResponse {
    pub query: String,
    pub mastercategory: Option<String>,
    pub category: Option<String>,
    pub total_results: usize,
    pub results: Vec<SearchResult>,
}

#[derive(Debug, Serialize)]
pub struct SearchResult {
    pub id: String,
    pub score: f32,
    pub resume_id: Option<i64>,
    pub candidate_name: Option<String>,
    pub metadata: serde_json::Value,
}

/// Which indexes a search touches: the one matching the requested
/// master-category, or both for a broad search.
pub fn indexes_to_search(master_category: Option<MasterCategory>) -> Vec<IndexName> {
    match master_category {
        Some(mc) => vec![IndexName::for_master_category(mc)],
        None => vec![IndexName::It, IndexName::NonIt],
    }
}

fn to_result(m: QueryMatch) -> SearchResult {
    let resume_id = m.metadata.get("resume_id").and_then(|v| v.as_i64());
    let candidate_name = m
        .metadata
        .get("candidate_name")
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .map(str::to_string);
    SearchResult {
        id: m.id,
        score: m.score,
        resume_id,
        candidate_name,
        metadata: m.metadata,
    }
}

/// POST /ai-search
pub async fn handle_ai_search(
    State(state): State<AppState>,
    Json(request): Json<AiSearchRequest>,
) -> Result<Json<AiSearchResponse>, AppError> {
    let query = request.query.trim().to_string();
    if query.is_empty() {
        return Err(AppError::Validation("query cannot be empty".to_string()));
    }
    let master_category = match request.mastercategory.as_deref() {
        None => None,
        Some(raw) => Some(MasterCategory::from_db_str(raw).ok_or_else(|| {
            AppError::Validation(format!(
                "mastercategory must be IT or NON_IT, got '{raw}'"
            ))
        })?),
    };

    // Query embeddings are cached like job-description embeddings: repeated
    // searches for the same text skip the embedding round-trip.
    let cache_key = format!("query:{query}");
    let embedding = match state.job_cache.get(&cache_key) {
        Some(entry) => entry.embedding,
        None => {
            let embedding = state
                .embedder
                .embed(&query)
                .await
                .map_err(|e| AppError::Llm(format!("query embedding failed: {e}")))?;
            state.job_cache.store(
                &cache_key,
                JobEntry {
                    embedding: embedding.clone(),
                    metadata: json!({"query": query}),
                },
            );
            embedding
        }
    };

    let namespace = namespace_for(request.category.as_deref());
    let top_k = request.top_k.unwrap_or(state.config.top_k_default);

    let mut results: Vec<SearchResult> = Vec::new();
    for index in indexes_to_search(master_category) {
        let matches = state
            .vectors
            .query(index, &namespace, &embedding, top_k, None)
            .await
            .map_err(|e| AppError::VectorStore(e.to_string()))?;
        results.extend(matches.into_iter().map(to_result));
    }

    results.retain(|r| r.score >= state.config.similarity_threshold);
    results.sort_by(|a, b| b.score.total_cmp(&a.score));
    results.truncate(top_k);

    info!(
        query_len = query.len(),
        namespace = %namespace,
        result_count = results.len(),
        "ai search completed"
    );

    Ok(Json(AiSearchResponse {
        query,
        mastercategory: master_category.map(|m| m.as_db_str().to_string()),
        category: request.category,
        total_results: results.len(),
        results,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indexes_for_explicit_master_category() {
        assert_eq!(
            indexes_to_search(Some(MasterCategory::It)),
            vec![IndexName::It]
        );
    }

    #[test]
    fn test_broad_search_hits_both_indexes() {
        assert_eq!(
            indexes_to_search(None),
            vec![IndexName::It, IndexName::NonIt]
        );
    }
}
