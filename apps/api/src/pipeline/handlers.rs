//! Axum route handler for resume upload.

use axum::extract::{Multipart, State};
use axum::Json;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::models::resume::ResumeRow;
use crate::pipeline::modules::ModuleSelection;
use crate::repo::resume::{ResumeField, ResumeRepository};
use crate::state::AppState;
use crate::textract::{self, TextractError};

#[derive(Debug, Serialize)]
pub struct ResumeUploadResponse {
    pub message: String,
    pub resume: ResumeRow,
}

#[derive(Default)]
struct UploadForm {
    file_bytes: Option<Vec<u8>>,
    filename: Option<String>,
    candidate_name: Option<String>,
    job_role: Option<String>,
    source: Option<String>,
    extract_modules: Option<String>,
}

async fn read_form(mut multipart: Multipart) -> Result<UploadForm, AppError> {
    let mut form = UploadForm::default();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("invalid multipart body: {e}")))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "file" => {
                form.filename = field.file_name().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("failed to read file: {e}")))?;
                form.file_bytes = Some(bytes.to_vec());
            }
            "candidate_name" => form.candidate_name = field.text().await.ok().filter(|s| !s.trim().is_empty()),
            "job_role" => form.job_role = field.text().await.ok().filter(|s| !s.trim().is_empty()),
            "source" => form.source = field.text().await.ok().filter(|s| !s.trim().is_empty()),
            "extract_modules" => form.extract_modules = field.text().await.ok(),
            other => {
                warn!(field = %other, "ignoring unknown multipart field");
            }
        }
    }
    Ok(form)
}

/// POST /upload-resume
///
/// Multipart upload: extracts text, creates the resume row, runs the
/// extraction pipeline, and enqueues vector indexing. The caller always
/// receives the resume id and whatever fields populated; null columns are
/// legal and meaningful.
pub async fn handle_upload_resume(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ResumeUploadResponse>, AppError> {
    let form = read_form(multipart).await?;

    let bytes = form
        .file_bytes
        .ok_or_else(|| AppError::Validation("missing 'file' field".to_string()))?;
    if bytes.is_empty() {
        return Err(AppError::Validation("uploaded file is empty".to_string()));
    }
    let filename = form
        .filename
        .filter(|f| !f.trim().is_empty())
        .ok_or_else(|| AppError::Validation("uploaded file has no filename".to_string()))?;

    if let Some(source) = &form.source {
        info!(file_name = %filename, source = %source, "resume upload tagged with source");
    }

    let repo = ResumeRepository::new(state.db.clone());

    // Duplicate detection: a filename already processed is returned as-is
    // instead of reprocessed.
    if let Some(existing) = repo.get_by_filename(&filename).await.map_err(anyhow::Error::from)? {
        info!(resume_id = existing.id, file_name = %filename, "duplicate upload");
        return Ok(Json(ResumeUploadResponse {
            message: format!("Resume '{filename}' already exists"),
            resume: existing,
        }));
    }

    // Text extraction happens before row creation: unsupported input means
    // no row at all.
    let text = match textract::extract_text(&bytes, &filename) {
        Ok(text) => text,
        Err(e @ (TextractError::Unsupported(_) | TextractError::NotUtf8)) => {
            return Err(AppError::UnsupportedFormat(e.to_string()));
        }
        Err(TextractError::Pdf(e)) => {
            return Err(AppError::UnsupportedFormat(format!(
                "could not extract text from PDF: {e}"
            )));
        }
    };

    let row = repo.create(&filename).await.map_err(anyhow::Error::from)?;
    let resume_id = row.id;

    // Seed the row with the text and any caller-supplied metadata before
    // extraction starts.
    let mut seed: Vec<(ResumeField, Option<String>)> =
        vec![(ResumeField::ResumeText, Some(text.clone()))];
    if let Some(name) = form.candidate_name {
        seed.push((ResumeField::CandidateName, Some(name)));
    }
    if let Some(job_role) = form.job_role {
        seed.push((ResumeField::JobRole, Some(job_role)));
    }
    repo.update(resume_id, &seed).await.map_err(anyhow::Error::from)?;

    // Too little text to extract anything meaningful: store the failure and
    // leave the row eligible for an OCR retry by an external collaborator.
    if text.trim().len() < state.config.min_resume_text_len {
        warn!(resume_id, text_len = text.trim().len(), "insufficient text extracted");
        repo.update_field(
            resume_id,
            ResumeField::Status,
            Some("failed:insufficient_text".to_string()),
        )
        .await
        .map_err(anyhow::Error::from)?;
        let resume = repo
            .get_by_id(resume_id)
            .await
            .map_err(anyhow::Error::from)?
            .ok_or_else(|| AppError::NotFound(format!("Resume {resume_id} not found")))?;
        return Ok(Json(ResumeUploadResponse {
            message: "Text extraction produced insufficient text".to_string(),
            resume,
        }));
    }

    let selection = form
        .extract_modules
        .as_deref()
        .map(ModuleSelection::parse)
        .unwrap_or_else(ModuleSelection::all);

    crate::pipeline::run_extraction(
        state.clone(),
        resume_id,
        Arc::from(filename.as_str()),
        Arc::from(text.as_str()),
        selection,
    )
    .await
    .map_err(AppError::Internal)?;

    // Text and master-category are final: enqueue vector indexing. It runs
    // independently of this request and is idempotent.
    let index_state = state.clone();
    tokio::spawn(async move {
        let service = crate::index::IndexingService::new(
            index_state.db.clone(),
            index_state.embedder.clone(),
            index_state.vectors.clone(),
        );
        if let Err(e) = service.index_resumes(None, Some(&[resume_id]), false).await {
            warn!(resume_id, error = %e, "background indexing failed");
        }
    });

    let resume = repo
        .get_by_id(resume_id)
        .await
        .map_err(anyhow::Error::from)?
        .ok_or_else(|| AppError::NotFound(format!("Resume {resume_id} not found")))?;

    Ok(Json(ResumeUploadResponse {
        message: "Resume processed".to_string(),
        resume,
    }))
}
