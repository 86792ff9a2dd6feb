//! Vector Indexer — chunk, embed, and durably upsert resume vectors.
//!
//! A resume is eligible once its text and master-category are present. The
//! indexed flag on the row flips to 1 strictly after the whole vector set
//! has been upserted; any failure leaves it untouched so the resume is
//! re-picked on the next run.

pub mod handlers;
pub mod skill_norm;

use serde::Serialize;
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::embedding::EmbeddingClient;
use crate::extract::experience::parse_experience_years;
use crate::models::resume::ResumeRow;
use crate::repo::resume::ResumeRepository;
use crate::vector::{namespace_for, IndexName, VectorRecord, VectorStore};

/// Metadata budget for the embedded copy of the resume text. The vendor-side
/// cap is ~40 KB per vector; 30 KB leaves room for the other fields.
const RESUME_TEXT_METADATA_CAP: usize = 30_000;
const TRUNCATION_MARKER: &str = "...[truncated]";

/// Overshoot window when deleting a prior vector set under force-reindex:
/// covers chunk-count shrinkage after a chunking-resolution change.
const REINDEX_DELETE_OVERSHOOT: usize = 32;

#[derive(Debug, Default, Serialize)]
pub struct IndexReport {
    pub indexed_count: usize,
    pub failed_count: usize,
    pub processed_ids: Vec<i64>,
    pub failed_ids: Vec<i64>,
    pub skipped_ids: Vec<i64>,
    pub message: String,
}

/// Stable vector id for one chunk of one resume.
pub fn vector_id(resume_id: i64, chunk_index: usize) -> String {
    format!("resume_{resume_id}_chunk_{chunk_index}")
}

/// Caps the resume text copy carried in vector metadata, appending the
/// truncation marker when anything was cut. Respects char boundaries.
pub fn truncate_resume_text(text: &str) -> String {
    if text.len() <= RESUME_TEXT_METADATA_CAP {
        return text.to_string();
    }
    let mut end = RESUME_TEXT_METADATA_CAP;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}{}", &text[..end], TRUNCATION_MARKER)
}

/// Metadata shared by every chunk of a resume: all row fields, the numeric
/// experience for range filters, normalized skills for the array filter, and
/// lowercased designation/jobrole for case-insensitive matching.
pub fn build_base_metadata(resume: &ResumeRow) -> serde_json::Value {
    let skills_array: Vec<String> = resume
        .skillset
        .as_deref()
        .map(|s| {
            let raw: Vec<&str> = s.split(',').map(str::trim).filter(|s| !s.is_empty()).collect();
            skill_norm::normalize_skill_list(&raw)
        })
        .unwrap_or_default();

    let experience_years = resume
        .experience
        .as_deref()
        .and_then(parse_experience_years);

    json!({
        "resume_id": resume.id,
        "candidate_id": format!("C{}", resume.id),
        "filename": resume.filename,
        "candidate_name": resume.candidatename.as_deref().unwrap_or(""),
        "name": resume.candidatename.as_deref().unwrap_or(""),
        "jobrole": resume.jobrole.as_deref().unwrap_or("").to_lowercase(),
        "designation": resume.designation.as_deref().unwrap_or("").to_lowercase(),
        "experience": resume.experience.as_deref().unwrap_or(""),
        "experience_years": experience_years,
        "domain": resume.domain.as_deref().unwrap_or(""),
        "mobile": resume.mobile.as_deref().unwrap_or(""),
        "email": resume.email.as_deref().unwrap_or(""),
        "education": resume.education.as_deref().unwrap_or(""),
        "location": resume.location.as_deref().unwrap_or(""),
        "skillset": resume.skillset.as_deref().unwrap_or(""),
        "skills": skills_array,
    })
}

pub struct IndexingService {
    repo: ResumeRepository,
    embedder: EmbeddingClient,
    store: Arc<dyn VectorStore>,
}

impl IndexingService {
    pub fn new(pool: PgPool, embedder: EmbeddingClient, store: Arc<dyn VectorStore>) -> Self {
        Self {
            repo: ResumeRepository::new(pool),
            embedder,
            store,
        }
    }

    /// Indexes pending resumes (or the given ids). With `force`, already
    /// indexed rows are reprocessed and their prior vector sets replaced.
    pub async fn index_resumes(
        &self,
        limit: Option<i64>,
        resume_ids: Option<&[i64]>,
        force: bool,
    ) -> anyhow::Result<IndexReport> {
        let pending = self
            .repo
            .pending_index_candidates(limit, resume_ids, force)
            .await?;

        if pending.is_empty() {
            info!("no pending resumes to index");
            return Ok(IndexReport {
                message: "No pending resumes to index".to_string(),
                ..IndexReport::default()
            });
        }

        info!(resume_count = pending.len(), force, "starting vector indexing");

        let mut report = IndexReport::default();
        for resume in &pending {
            // The candidate query already guarantees text and mastercategory,
            // but re-check here: rows can mutate between select and index.
            if resume.resume_text.as_deref().map(str::trim).unwrap_or("").is_empty() {
                warn!(resume_id = resume.id, "skipping: missing resume_text");
                report.skipped_ids.push(resume.id);
                continue;
            }
            let Some(master_category) = resume.master_category() else {
                warn!(resume_id = resume.id, "skipping: missing mastercategory");
                report.skipped_ids.push(resume.id);
                continue;
            };

            match self.index_single(resume, master_category, force).await {
                Ok(vector_count) => {
                    info!(resume_id = resume.id, vector_count, "indexed resume");
                    report.indexed_count += 1;
                    report.processed_ids.push(resume.id);
                }
                Err(e) => {
                    error!(resume_id = resume.id, error = %e, "failed to index resume");
                    report.failed_count += 1;
                    report.failed_ids.push(resume.id);
                }
            }
        }

        report.message = format!(
            "Indexed {} resumes. Failed: {}. Skipped: {}",
            report.indexed_count,
            report.failed_count,
            report.skipped_ids.len()
        );
        Ok(report)
    }

    /// Indexes one resume. The flag flip is the last step; nothing before it
    /// marks the row done.
    async fn index_single(
        &self,
        resume: &ResumeRow,
        master_category: crate::models::resume::MasterCategory,
        force: bool,
    ) -> anyhow::Result<usize> {
        let text = resume.resume_text.as_deref().unwrap_or("");
        let base_metadata = build_base_metadata(resume);
        let resume_text_meta = truncate_resume_text(text);

        let chunks = self.embedder.embed_chunks(text).await?;
        if chunks.is_empty() {
            anyhow::bail!("no embeddings generated for resume {}", resume.id);
        }

        let mut vectors = Vec::with_capacity(chunks.len());
        for chunk in &chunks {
            let mut metadata = base_metadata.clone();
            let object = metadata.as_object_mut().expect("metadata is an object");
            object.insert("type".into(), json!("resume"));
            object.insert("chunk_index".into(), json!(chunk.chunk_index));
            object.insert("chunk_text".into(), json!(chunk.text));
            object.insert("resume_text".into(), json!(resume_text_meta));

            vectors.push(VectorRecord {
                id: vector_id(resume.id, chunk.chunk_index),
                values: chunk.embedding.clone(),
                metadata,
            });
        }

        let index = IndexName::for_master_category(master_category);
        let namespace = namespace_for(resume.category.as_deref());

        // Force-reindex replaces the prior set wholesale: delete the old ids
        // (with overshoot for shrunken chunk counts) before upserting.
        if force {
            let stale_ids: Vec<String> = (0..vectors.len() + REINDEX_DELETE_OVERSHOOT)
                .map(|i| vector_id(resume.id, i))
                .collect();
            self.store.delete(index, &namespace, &stale_ids).await?;
        }

        self.store.upsert(index, &namespace, &vectors).await?;

        // Durable upsert succeeded; only now may the flag flip.
        self.repo.set_indexed_flag(resume.id, 1).await?;

        Ok(vectors.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample_row() -> ResumeRow {
        ResumeRow {
            id: 7,
            filename: "jane.pdf".to_string(),
            resume_text: Some("text".to_string()),
            mastercategory: Some("IT".to_string()),
            category: Some("data science".to_string()),
            candidatename: Some("Jane Doe".to_string()),
            designation: Some("Senior Data Scientist".to_string()),
            jobrole: Some("Data Scientist".to_string()),
            experience: Some("5.5 years".to_string()),
            domain: Some("Healthcare".to_string()),
            mobile: Some("+15551234567".to_string()),
            email: Some("jane@example.com".to_string()),
            education: Some("MS Statistics".to_string()),
            location: Some("Austin, TX".to_string()),
            skillset: Some("Python, React.js, reactjs, SQL".to_string()),
            status: Some("ok".to_string()),
            indexed_flag: Some(0),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_vector_id_format() {
        assert_eq!(vector_id(42, 3), "resume_42_chunk_3");
    }

    #[test]
    fn test_truncate_under_cap_is_identity() {
        let text = "short resume text";
        assert_eq!(truncate_resume_text(text), text);
    }

    #[test]
    fn test_truncate_caps_and_marks() {
        // A 50 KB text must cap at 30 KB with the marker.
        let text = "x".repeat(50_000);
        let truncated = truncate_resume_text(&text);
        assert!(truncated.len() <= RESUME_TEXT_METADATA_CAP + TRUNCATION_MARKER.len());
        assert!(truncated.ends_with(TRUNCATION_MARKER));
    }

    #[test]
    fn test_truncate_respects_char_boundary() {
        let text = "é".repeat(20_000); // 40 KB of two-byte chars
        let truncated = truncate_resume_text(&text);
        assert!(truncated.ends_with(TRUNCATION_MARKER));
    }

    #[test]
    fn test_base_metadata_fields() {
        let metadata = build_base_metadata(&sample_row());
        assert_eq!(metadata["resume_id"], 7);
        assert_eq!(metadata["candidate_id"], "C7");
        assert_eq!(metadata["experience_years"], 5);
        // Lowercased for case-insensitive filtering.
        assert_eq!(metadata["designation"], "senior data scientist");
        assert_eq!(metadata["jobrole"], "data scientist");
        // Skills normalized and deduplicated.
        let skills: Vec<&str> = metadata["skills"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect();
        assert_eq!(skills, vec!["python", "react", "sql"]);
        // Original string preserved alongside.
        assert_eq!(metadata["skillset"], "Python, React.js, reactjs, SQL");
    }

    #[test]
    fn test_base_metadata_handles_missing_fields() {
        let mut row = sample_row();
        row.skillset = None;
        row.experience = None;
        row.candidatename = None;
        let metadata = build_base_metadata(&row);
        assert_eq!(metadata["skills"].as_array().unwrap().len(), 0);
        assert_eq!(metadata["experience_years"], serde_json::Value::Null);
        assert_eq!(metadata["candidate_name"], "");
    }
}
