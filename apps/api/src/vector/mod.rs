//! Vector store abstraction: a remote serverless backend and a persisted
//! local flat index as the disaster-recovery fallback.
//!
//! Indexes are routed by master-category (one IT index, one Non-IT index);
//! namespaces within an index are named by the resume's category with
//! "other" as the fallback namespace.

pub mod local;
pub mod pinecone;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

use crate::config::Config;
use crate::models::resume::MasterCategory;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IndexName {
    It,
    NonIt,
}

impl IndexName {
    pub fn for_master_category(master_category: MasterCategory) -> Self {
        match master_category {
            MasterCategory::It => IndexName::It,
            MasterCategory::NonIt => IndexName::NonIt,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            IndexName::It => "resumes-it",
            IndexName::NonIt => "resumes-non-it",
        }
    }
}

/// Namespace for a resume's vectors: its category (lowercased) or "other".
pub fn namespace_for(category: Option<&str>) -> String {
    match category {
        Some(c) if !c.trim().is_empty() => c.trim().to_lowercase(),
        _ => "other".to_string(),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorRecord {
    pub id: String,
    pub values: Vec<f32>,
    pub metadata: serde_json::Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct QueryMatch {
    pub id: String,
    pub score: f32,
    pub metadata: serde_json::Value,
}

#[derive(Debug, Error)]
pub enum VectorStoreError {
    #[error("vector store unavailable: {0}")]
    Unavailable(String),

    #[error("vector store returned HTTP {0}")]
    HttpStatus(u16),

    #[error("malformed vector store response: {0}")]
    Malformed(String),

    #[error("local index I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("local index corrupt: {0}")]
    Corrupt(String),
}

#[async_trait]
pub trait VectorStore: Send + Sync {
    async fn upsert(
        &self,
        index: IndexName,
        namespace: &str,
        records: &[VectorRecord],
    ) -> Result<(), VectorStoreError>;

    async fn query(
        &self,
        index: IndexName,
        namespace: &str,
        vector: &[f32],
        top_k: usize,
        filter: Option<serde_json::Value>,
    ) -> Result<Vec<QueryMatch>, VectorStoreError>;

    async fn delete(
        &self,
        index: IndexName,
        namespace: &str,
        ids: &[String],
    ) -> Result<(), VectorStoreError>;
}

/// Selects the configured backend.
pub fn build_store(config: &Config) -> anyhow::Result<Arc<dyn VectorStore>> {
    match config.vector_backend.as_str() {
        "pinecone" => Ok(Arc::new(pinecone::PineconeStore::new(
            config.pinecone_api_key.clone(),
            config.pinecone_it_host.clone(),
            config.pinecone_non_it_host.clone(),
        ))),
        "local" => Ok(Arc::new(local::LocalStore::new(
            config.local_index_dir.clone().into(),
        ))),
        other => anyhow::bail!("unknown vector backend '{other}' (expected 'pinecone' or 'local')"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_routing_by_master_category() {
        assert_eq!(
            IndexName::for_master_category(MasterCategory::It),
            IndexName::It
        );
        assert_eq!(
            IndexName::for_master_category(MasterCategory::NonIt),
            IndexName::NonIt
        );
    }

    #[test]
    fn test_namespace_fallback_is_other() {
        assert_eq!(namespace_for(None), "other");
        assert_eq!(namespace_for(Some("")), "other");
        assert_eq!(namespace_for(Some("  ")), "other");
    }

    #[test]
    fn test_namespace_lowercases_category() {
        assert_eq!(
            namespace_for(Some("Full Stack Development (Java)")),
            "full stack development (java)"
        );
    }
}
