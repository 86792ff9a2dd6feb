//! Local fallback backend: a persisted flat inner-product index.
//!
//! One JSON file per index under the configured directory. Vectors are
//! unit-normalized upstream, so inner product equals cosine similarity.
//! Deletion is a logical tombstone filtered at query time; a re-upsert of a
//! tombstoned id resurrects it.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use tokio::sync::Mutex;
use tracing::info;

use super::{IndexName, QueryMatch, VectorRecord, VectorStore, VectorStoreError};

#[derive(Debug, Default, Serialize, Deserialize)]
struct IndexFile {
    records: HashMap<String, StoredRecord>,
    tombstones: HashSet<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredRecord {
    values: Vec<f32>,
    metadata: Value,
    namespace: String,
}

pub struct LocalStore {
    dir: PathBuf,
    // One lock for both files: local mode is a single-process fallback.
    lock: Mutex<()>,
}

impl LocalStore {
    pub fn new(dir: PathBuf) -> Self {
        Self {
            dir,
            lock: Mutex::new(()),
        }
    }

    fn path(&self, index: IndexName) -> PathBuf {
        self.dir.join(format!("{}.json", index.as_str()))
    }

    fn load(&self, index: IndexName) -> Result<IndexFile, VectorStoreError> {
        let path = self.path(index);
        if !path.exists() {
            return Ok(IndexFile::default());
        }
        let raw = std::fs::read_to_string(&path)?;
        serde_json::from_str(&raw).map_err(|e| VectorStoreError::Corrupt(e.to_string()))
    }

    fn persist(&self, index: IndexName, file: &IndexFile) -> Result<(), VectorStoreError> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.path(index);
        let tmp = path.with_extension("json.tmp");
        let raw =
            serde_json::to_string(file).map_err(|e| VectorStoreError::Corrupt(e.to_string()))?;
        std::fs::write(&tmp, raw)?;
        std::fs::rename(&tmp, &path)?;
        Ok(())
    }
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Minimal metadata filter: every key must match by equality, with `{"$eq": v}`
/// accepted as an alias for a bare value.
fn matches_filter(metadata: &Value, filter: &Value) -> bool {
    let Some(conditions) = filter.as_object() else {
        return true;
    };
    conditions.iter().all(|(key, expected)| {
        let actual = metadata.get(key);
        let expected = expected.get("$eq").unwrap_or(expected);
        actual == Some(expected)
    })
}

#[async_trait]
impl VectorStore for LocalStore {
    async fn upsert(
        &self,
        index: IndexName,
        namespace: &str,
        records: &[VectorRecord],
    ) -> Result<(), VectorStoreError> {
        let _guard = self.lock.lock().await;
        let mut file = self.load(index)?;
        for record in records {
            file.tombstones.remove(&record.id);
            file.records.insert(
                record.id.clone(),
                StoredRecord {
                    values: record.values.clone(),
                    metadata: record.metadata.clone(),
                    namespace: namespace.to_string(),
                },
            );
        }
        self.persist(index, &file)?;
        info!(
            index = index.as_str(),
            namespace,
            count = records.len(),
            "upserted vectors into local index"
        );
        Ok(())
    }

    async fn query(
        &self,
        index: IndexName,
        namespace: &str,
        vector: &[f32],
        top_k: usize,
        filter: Option<Value>,
    ) -> Result<Vec<QueryMatch>, VectorStoreError> {
        let _guard = self.lock.lock().await;
        let file = self.load(index)?;

        let mut scored: Vec<QueryMatch> = file
            .records
            .iter()
            .filter(|(id, record)| {
                record.namespace == namespace && !file.tombstones.contains(*id)
            })
            .filter(|(_, record)| {
                filter
                    .as_ref()
                    .map(|f| matches_filter(&record.metadata, f))
                    .unwrap_or(true)
            })
            .map(|(id, record)| QueryMatch {
                id: id.clone(),
                score: dot(vector, &record.values),
                metadata: record.metadata.clone(),
            })
            .collect();

        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(top_k);
        Ok(scored)
    }

    async fn delete(
        &self,
        index: IndexName,
        namespace: &str,
        ids: &[String],
    ) -> Result<(), VectorStoreError> {
        let _guard = self.lock.lock().await;
        let mut file = self.load(index)?;
        for id in ids {
            if let Some(record) = file.records.get(id) {
                if record.namespace == namespace {
                    file.tombstones.insert(id.clone());
                }
            }
        }
        self.persist(index, &file)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(id: &str, values: Vec<f32>, resume_id: i64) -> VectorRecord {
        VectorRecord {
            id: id.to_string(),
            values,
            metadata: json!({"resume_id": resume_id, "type": "resume"}),
        }
    }

    #[tokio::test]
    async fn test_upsert_query_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path().to_path_buf());

        store
            .upsert(
                IndexName::It,
                "other",
                &[
                    record("resume_1_chunk_0", vec![1.0, 0.0], 1),
                    record("resume_2_chunk_0", vec![0.0, 1.0], 2),
                ],
            )
            .await
            .unwrap();

        let matches = store
            .query(IndexName::It, "other", &[1.0, 0.0], 10, None)
            .await
            .unwrap();
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].id, "resume_1_chunk_0");
        assert!(matches[0].score > matches[1].score);
    }

    #[tokio::test]
    async fn test_upsert_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path().to_path_buf());
        let records = [record("resume_1_chunk_0", vec![1.0, 0.0], 1)];

        store.upsert(IndexName::It, "other", &records).await.unwrap();
        store.upsert(IndexName::It, "other", &records).await.unwrap();

        let matches = store
            .query(IndexName::It, "other", &[1.0, 0.0], 10, None)
            .await
            .unwrap();
        assert_eq!(matches.len(), 1);
    }

    #[tokio::test]
    async fn test_namespaces_are_isolated() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path().to_path_buf());

        store
            .upsert(IndexName::It, "data science", &[record("a", vec![1.0, 0.0], 1)])
            .await
            .unwrap();

        let other = store
            .query(IndexName::It, "other", &[1.0, 0.0], 10, None)
            .await
            .unwrap();
        assert!(other.is_empty());
    }

    #[tokio::test]
    async fn test_delete_is_logical_tombstone() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path().to_path_buf());
        store
            .upsert(IndexName::NonIt, "other", &[record("a", vec![1.0, 0.0], 1)])
            .await
            .unwrap();

        store
            .delete(IndexName::NonIt, "other", &["a".to_string()])
            .await
            .unwrap();
        let matches = store
            .query(IndexName::NonIt, "other", &[1.0, 0.0], 10, None)
            .await
            .unwrap();
        assert!(matches.is_empty());

        // Re-upsert resurrects the id.
        store
            .upsert(IndexName::NonIt, "other", &[record("a", vec![1.0, 0.0], 1)])
            .await
            .unwrap();
        let matches = store
            .query(IndexName::NonIt, "other", &[1.0, 0.0], 10, None)
            .await
            .unwrap();
        assert_eq!(matches.len(), 1);
    }

    #[tokio::test]
    async fn test_metadata_filter_equality() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path().to_path_buf());
        store
            .upsert(
                IndexName::It,
                "other",
                &[
                    record("a", vec![1.0, 0.0], 1),
                    record("b", vec![0.9, 0.1], 2),
                ],
            )
            .await
            .unwrap();

        let matches = store
            .query(
                IndexName::It,
                "other",
                &[1.0, 0.0],
                10,
                Some(json!({"resume_id": {"$eq": 2}})),
            )
            .await
            .unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].id, "b");
    }

    #[tokio::test]
    async fn test_persistence_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = LocalStore::new(dir.path().to_path_buf());
            store
                .upsert(IndexName::It, "other", &[record("a", vec![1.0, 0.0], 1)])
                .await
                .unwrap();
        }
        let reopened = LocalStore::new(dir.path().to_path_buf());
        let matches = reopened
            .query(IndexName::It, "other", &[1.0, 0.0], 10, None)
            .await
            .unwrap();
        assert_eq!(matches.len(), 1);
    }
}
