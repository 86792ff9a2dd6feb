//! Embedding Gateway — dense vectors from the model server.
//!
//! Probes for the preferred embedding model and falls back to the secondary
//! one. Every returned vector is unit-normalized so downstream inner-product
//! scoring is cosine similarity.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::{info, warn};

const TAGS_TIMEOUT: Duration = Duration::from_secs(10);
const EMBED_TIMEOUT: Duration = Duration::from_secs(600);
const MAX_RETRIES: u32 = 3;

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("embedding server unavailable: {0}")]
    Unavailable(String),

    #[error("no embedding model available (tried {preferred} and {fallback})")]
    NoModel { preferred: String, fallback: String },

    #[error("embedding server returned HTTP {0}")]
    HttpStatus(u16),

    #[error("malformed embedding response: {0}")]
    Malformed(String),
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    #[serde(default)]
    embedding: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<TagEntry>,
}

#[derive(Debug, Deserialize)]
struct TagEntry {
    #[serde(default)]
    name: String,
}

/// One embedded chunk of a larger text.
#[derive(Debug, Clone)]
pub struct ChunkEmbedding {
    pub embedding: Vec<f32>,
    pub text: String,
    pub chunk_index: usize,
}

/// Splits text into contiguous overlapping character windows. The last chunk
/// may be short. Concatenating chunks with overlaps removed reproduces the
/// input exactly.
pub fn chunk_text(text: &str, chunk_size: usize, chunk_overlap: usize) -> Vec<String> {
    assert!(chunk_overlap < chunk_size, "overlap must be smaller than the window");

    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= chunk_size {
        return vec![text.to_string()];
    }

    let step = chunk_size - chunk_overlap;
    let mut chunks = Vec::new();
    let mut start = 0;
    while start < chars.len() {
        let end = (start + chunk_size).min(chars.len());
        chunks.push(chars[start..end].iter().collect());
        if end >= chars.len() {
            break;
        }
        start += step;
    }
    chunks
}

/// Scales a vector to unit length. Zero vectors pass through unchanged.
pub fn normalize(mut embedding: Vec<f32>) -> Vec<f32> {
    let norm = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in &mut embedding {
            *x /= norm;
        }
    }
    embedding
}

#[derive(Clone)]
pub struct EmbeddingClient {
    client: Client,
    host: String,
    preferred_model: String,
    fallback_model: String,
    dimension: usize,
    chunk_size: usize,
    chunk_overlap: usize,
    batch_size: usize,
    resolved_model: std::sync::Arc<OnceCell<String>>,
}

impl EmbeddingClient {
    pub fn new(
        host: String,
        preferred_model: String,
        fallback_model: String,
        dimension: usize,
        chunk_size: usize,
        chunk_overlap: usize,
        batch_size: usize,
    ) -> Self {
        Self {
            client: Client::builder()
                .build()
                .expect("Failed to build HTTP client"),
            host,
            preferred_model,
            fallback_model,
            dimension,
            chunk_size,
            chunk_overlap,
            batch_size,
            resolved_model: std::sync::Arc::new(OnceCell::new()),
        }
    }

    /// Resolves which embedding model to use, probing the server once.
    async fn model(&self) -> Result<&str, EmbeddingError> {
        self.resolved_model
            .get_or_try_init(|| async {
                let installed = self.installed_models().await?;
                if installed
                    .iter()
                    .any(|name| name.starts_with(&self.preferred_model))
                {
                    info!(model = %self.preferred_model, "using preferred embedding model");
                    return Ok(self.preferred_model.clone());
                }
                if installed
                    .iter()
                    .any(|name| name.starts_with(&self.fallback_model))
                {
                    warn!(
                        model = %self.fallback_model,
                        "preferred embedding model unavailable, using fallback"
                    );
                    return Ok(self.fallback_model.clone());
                }
                Err(EmbeddingError::NoModel {
                    preferred: self.preferred_model.clone(),
                    fallback: self.fallback_model.clone(),
                })
            })
            .await
            .map(String::as_str)
    }

    async fn installed_models(&self) -> Result<Vec<String>, EmbeddingError> {
        let url = format!("{}/api/tags", self.host);
        let response = self
            .client
            .get(&url)
            .timeout(TAGS_TIMEOUT)
            .send()
            .await
            .map_err(|e| EmbeddingError::Unavailable(e.to_string()))?;
        if !response.status().is_success() {
            return Err(EmbeddingError::HttpStatus(response.status().as_u16()));
        }
        let tags: TagsResponse = response
            .json()
            .await
            .map_err(|e| EmbeddingError::Malformed(e.to_string()))?;
        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }

    /// Embeds a single text, retrying up to 3 times with exponential backoff.
    /// The returned vector is unit-normalized.
    pub async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let model = self.model().await?.to_string();

        let mut last_error = None;
        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                let wait = Duration::from_secs(1 << (attempt - 1));
                warn!(attempt, ?wait, "embedding call failed, retrying");
                tokio::time::sleep(wait).await;
            }

            match self.embed_once(&model, text).await {
                Ok(embedding) => return Ok(normalize(embedding)),
                Err(e) => last_error = Some(e),
            }
        }
        Err(last_error.unwrap_or_else(|| EmbeddingError::Unavailable("exhausted retries".into())))
    }

    async fn embed_once(&self, model: &str, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let url = format!("{}/api/embeddings", self.host);
        let response = self
            .client
            .post(&url)
            .timeout(EMBED_TIMEOUT)
            .json(&EmbeddingRequest {
                model,
                prompt: text,
            })
            .send()
            .await
            .map_err(|e| EmbeddingError::Unavailable(e.to_string()))?;
        if !response.status().is_success() {
            return Err(EmbeddingError::HttpStatus(response.status().as_u16()));
        }
        let body: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| EmbeddingError::Malformed(e.to_string()))?;
        if body.embedding.is_empty() {
            return Err(EmbeddingError::Malformed("empty embedding returned".into()));
        }
        if body.embedding.len() != self.dimension {
            warn!(
                expected = self.dimension,
                actual = body.embedding.len(),
                "embedding dimension differs from configuration"
            );
        }
        Ok(body.embedding)
    }

    /// Chunks text and embeds each chunk, processing in bounded batches so a
    /// long resume never holds every in-flight request at once. A failed
    /// chunk is skipped; the rest of the set still embeds.
    pub async fn embed_chunks(&self, text: &str) -> Result<Vec<ChunkEmbedding>, EmbeddingError> {
        let chunks = chunk_text(text, self.chunk_size, self.chunk_overlap);
        let batch_size = self.batch_size.max(1);
        info!(
            chunk_count = chunks.len(),
            text_length = text.len(),
            batch_size,
            "generating chunk embeddings"
        );

        let mut embeddings = Vec::with_capacity(chunks.len());
        for (batch_number, batch) in chunks.chunks(batch_size).enumerate() {
            for (offset, chunk) in batch.iter().enumerate() {
                let chunk_index = batch_number * batch_size + offset;
                match self.embed(chunk).await {
                    Ok(embedding) => embeddings.push(ChunkEmbedding {
                        embedding,
                        text: chunk.clone(),
                        chunk_index,
                    }),
                    Err(e) => {
                        warn!(chunk_index, error = %e, "failed to embed chunk, skipping");
                    }
                }
            }
        }
        Ok(embeddings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_is_single_chunk() {
        let chunks = chunk_text("short", 1000, 200);
        assert_eq!(chunks, vec!["short"]);
    }

    #[test]
    fn test_chunks_are_contiguous_and_overlapping() {
        let text: String = ('a'..='z').cycle().take(2500).collect();
        let chunks = chunk_text(&text, 1000, 200);

        assert_eq!(chunks[0].chars().count(), 1000);
        assert_eq!(chunks[1].chars().count(), 1000);
        // Each successive chunk starts 800 chars later and repeats the last 200.
        let tail_of_first: String = chunks[0].chars().skip(800).collect();
        let head_of_second: String = chunks[1].chars().take(200).collect();
        assert_eq!(tail_of_first, head_of_second);
    }

    #[test]
    fn test_chunk_reassembly_reproduces_text() {
        let text: String = "0123456789".chars().cycle().take(3333).collect();
        let (size, overlap) = (1000, 200);
        let chunks = chunk_text(&text, size, overlap);

        let mut rebuilt = chunks[0].clone();
        for chunk in &chunks[1..] {
            rebuilt.extend(chunk.chars().skip(overlap));
        }
        assert_eq!(rebuilt, text);
    }

    #[test]
    fn test_last_chunk_may_be_short() {
        let text: String = "x".repeat(1100);
        let chunks = chunk_text(&text, 1000, 200);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[1].chars().count(), 300);
    }

    #[test]
    fn test_normalize_produces_unit_vector() {
        let normalized = normalize(vec![3.0, 4.0]);
        let norm: f32 = normalized.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-6);
        assert!((normalized[0] - 0.6).abs() < 1e-6);
        assert!((normalized[1] - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_normalize_zero_vector_unchanged() {
        assert_eq!(normalize(vec![0.0, 0.0]), vec![0.0, 0.0]);
    }
}
