//! Remote vector backend speaking the Pinecone data-plane REST API.
//!
//! One host per index (IT / Non-IT). Upserts are sent in bounded batches so
//! a long resume never produces an oversized request body.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::info;

use super::{IndexName, QueryMatch, VectorRecord, VectorStore, VectorStoreError};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
const UPSERT_BATCH: usize = 100;

#[derive(Debug, Serialize)]
struct UpsertRequest<'a> {
    vectors: &'a [VectorRecord],
    namespace: &'a str,
}

#[derive(Debug, Serialize)]
struct QueryRequest<'a> {
    vector: &'a [f32],
    #[serde(rename = "topK")]
    top_k: usize,
    #[serde(rename = "includeMetadata")]
    include_metadata: bool,
    namespace: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    filter: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<RawMatch>,
}

#[derive(Debug, Deserialize)]
struct RawMatch {
    id: String,
    #[serde(default)]
    score: f32,
    #[serde(default)]
    metadata: Value,
}

#[derive(Debug, Serialize)]
struct DeleteRequest<'a> {
    ids: &'a [String],
    namespace: &'a str,
}

pub struct PineconeStore {
    client: Client,
    api_key: String,
    it_host: String,
    non_it_host: String,
}

impl PineconeStore {
    pub fn new(api_key: String, it_host: String, non_it_host: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
            it_host,
            non_it_host,
        }
    }

    fn host(&self, index: IndexName) -> &str {
        match index {
            IndexName::It => &self.it_host,
            IndexName::NonIt => &self.non_it_host,
        }
    }

    async fn post<B: Serialize>(
        &self,
        index: IndexName,
        path: &str,
        body: &B,
    ) -> Result<reqwest::Response, VectorStoreError> {
        let host = self.host(index);
        if host.is_empty() {
            return Err(VectorStoreError::Unavailable(format!(
                "no host configured for index {}",
                index.as_str()
            )));
        }
        let response = self
            .client
            .post(format!("{host}{path}"))
            .header("Api-Key", &self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| VectorStoreError::Unavailable(e.to_string()))?;
        if !response.status().is_success() {
            return Err(VectorStoreError::HttpStatus(response.status().as_u16()));
        }
        Ok(response)
    }
}

#[async_trait]
impl VectorStore for PineconeStore {
    async fn upsert(
        &self,
        index: IndexName,
        namespace: &str,
        records: &[VectorRecord],
    ) -> Result<(), VectorStoreError> {
        for batch in records.chunks(UPSERT_BATCH) {
            self.post(
                index,
                "/vectors/upsert",
                &UpsertRequest {
                    vectors: batch,
                    namespace,
                },
            )
            .await?;
        }
        info!(
            index = index.as_str(),
            namespace,
            count = records.len(),
            "upserted vectors"
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
        let response = self
            .post(
                index,
                "/query",
                &QueryRequest {
                    vector,
                    top_k,
                    include_metadata: true,
                    namespace,
                    filter,
                },
            )
            .await?;
        let body: QueryResponse = response
            .json()
            .await
            .map_err(|e| VectorStoreError::Malformed(e.to_string()))?;
        Ok(body
            .matches
            .into_iter()
            .map(|m| QueryMatch {
                id: m.id,
                score: m.score,
                metadata: m.metadata,
            })
            .collect())
    }

    async fn delete(
        &self,
        index: IndexName,
        namespace: &str,
        ids: &[String],
    ) -> Result<(), VectorStoreError> {
        if ids.is_empty() {
            return Ok(());
        }
        self.post(index, "/vectors/delete", &DeleteRequest { ids, namespace })
            .await?;
        info!(index = index.as_str(), namespace, count = ids.len(), "deleted vectors");
        Ok(())
    }
}
