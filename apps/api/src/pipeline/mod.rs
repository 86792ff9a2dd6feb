//! Pipeline Orchestrator.
//!
//! Dependency order: master-category runs first (prompt routing and index
//! selection hang off it), category second, then the independent field
//! extractors fan out as concurrent sub-tasks bounded by a semaphore. Each
//! extractor writes exactly one column through its own short transaction, so
//! one failure never rolls back or blocks another. A resume-level deadline
//! cancels stragglers; columns already persisted are kept.

pub mod handlers;
pub mod modules;

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::domain;
use crate::extract;
use crate::models::resume::MasterCategory;
use crate::repo::resume::{ResumeField, ResumeRepository};
use crate::state::AppState;
use modules::{ExtractModule, ModuleSelection};

/// Runs the extraction pipeline for one already-created resume row whose
/// text is already persisted. Returns the final status string.
pub async fn run_extraction(
    state: AppState,
    resume_id: i64,
    filename: Arc<str>,
    resume_text: Arc<str>,
    selection: ModuleSelection,
) -> anyhow::Result<String> {
    state.in_flight.lock().expect("in-flight set poisoned").insert(resume_id);
    let result = run_extraction_inner(&state, resume_id, filename, resume_text, selection).await;
    state.in_flight.lock().expect("in-flight set poisoned").remove(&resume_id);
    result
}

async fn run_extraction_inner(
    state: &AppState,
    resume_id: i64,
    filename: Arc<str>,
    resume_text: Arc<str>,
    selection: ModuleSelection,
) -> anyhow::Result<String> {
    let repo = ResumeRepository::new(state.db.clone());
    let config = &state.config;

    // Master-category is sequential: skills routing and index selection
    // depend on it. The classifier defaults to NON_IT on failure, so the
    // column is always populated.
    let master_category = extract::master_category::extract_master_category(
        &state.llm,
        &resume_text,
        &filename,
        Duration::from_secs(config.timeout_default_secs),
    )
    .await;
    repo.update_field(
        resume_id,
        ResumeField::MasterCategory,
        Some(master_category.as_db_str().to_string()),
    )
    .await?;

    // Category consumes master-category and feeds the skills prompt lookup
    // and the vector namespace.
    let category = extract::category::extract_category(
        &state.llm,
        &resume_text,
        master_category,
        &filename,
        Duration::from_secs(config.timeout_default_secs),
    )
    .await;
    repo.update_field(resume_id, ResumeField::Category, category)
        .await?;

    // Fan out the independent extractors, bounded by the semaphore so a
    // burst of uploads cannot overwhelm the local model server.
    info!(resume_id, modules = selection.len(), "fanning out field extractors");
    let semaphore = Arc::new(Semaphore::new(config.extract_concurrency.max(1)));
    let mut tasks: JoinSet<()> = JoinSet::new();

    for module in ExtractModule::ALL {
        if !selection.contains(module) {
            continue;
        }
        let state = state.clone();
        let semaphore = semaphore.clone();
        let filename = filename.clone();
        let resume_text = resume_text.clone();

        tasks.spawn(async move {
            let _permit = match semaphore.acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => return,
            };
            run_module(&state, resume_id, module, &filename, &resume_text).await;
        });
    }

    // Resume-level deadline: abort what is left, keep what already landed.
    let deadline = Duration::from_secs(config.resume_deadline_secs);
    let drained = tokio::time::timeout(deadline, async {
        while tasks.join_next().await.is_some() {}
    })
    .await;
    if drained.is_err() {
        warn!(resume_id, "resume deadline exceeded, cancelling remaining extractors");
        tasks.abort_all();
        while tasks.join_next().await.is_some() {}
    }

    repo.update_field(resume_id, ResumeField::Status, Some("ok".to_string()))
        .await?;
    info!(resume_id, "extraction pipeline completed");
    Ok("ok".to_string())
}

/// Runs one extractor and writes its single column. Failures are logged and
/// stored as null; they never propagate.
async fn run_module(
    state: &AppState,
    resume_id: i64,
    module: ExtractModule,
    filename: &str,
    resume_text: &str,
) {
    let repo = ResumeRepository::new(state.db.clone());
    let config = &state.config;
    let llm = &state.llm;
    let default_deadline = Duration::from_secs(config.timeout_default_secs);

    let (field, value) = match module {
        ExtractModule::Designation => (
            ResumeField::Designation,
            extract::designation::extract_designation(llm, resume_text, filename, default_deadline)
                .await,
        ),
        ExtractModule::Name => (
            ResumeField::CandidateName,
            extract::name::extract_name(
                llm,
                resume_text,
                filename,
                Duration::from_secs(config.timeout_name_secs),
            )
            .await,
        ),
        ExtractModule::Email => (
            ResumeField::Email,
            extract::contact::extract_email(resume_text),
        ),
        ExtractModule::Mobile => (
            ResumeField::Mobile,
            extract::contact::extract_mobile(resume_text),
        ),
        ExtractModule::Experience => (
            ResumeField::Experience,
            extract::experience::extract_experience(llm, resume_text, filename, default_deadline)
                .await,
        ),
        ExtractModule::Domain => (
            ResumeField::Domain,
            domain::extract_domain(
                llm,
                resume_text,
                filename,
                Duration::from_secs(config.timeout_domain_secs),
            )
            .await,
        ),
        ExtractModule::Education => (
            ResumeField::Education,
            extract::education::extract_education(llm, resume_text, filename, default_deadline)
                .await,
        ),
        ExtractModule::Skills => {
            let prompts = crate::repo::prompt::PromptRepository::new(state.db.clone());
            // Routing columns are re-read through the map form rather than
            // passed in memory: sub-tasks must see what actually committed.
            let row = repo.get_by_id_map(resume_id).await.ok().flatten();
            let master_category = row
                .as_ref()
                .and_then(|m| m.get("mastercategory"))
                .and_then(|v| v.as_str())
                .and_then(MasterCategory::from_db_str);
            let category = row
                .as_ref()
                .and_then(|m| m.get("category"))
                .and_then(|v| v.as_str())
                .map(str::to_string);
            (
                ResumeField::Skillset,
                extract::skills::extract_skillset(
                    llm,
                    &prompts,
                    master_category,
                    category.as_deref(),
                    resume_text,
                    filename,
                    Duration::from_secs(config.timeout_skills_secs),
                )
                .await,
            )
        }
    };

    // Job role is not part of the module selector; it rides along with the
    // designation extractor. The two columns stay independent: no
    // reconciliation even when both point at the same title.
    if module == ExtractModule::Designation {
        let job_role = extract::role::extract_role(llm, resume_text, filename, default_deadline).await;
        if let Err(e) = repo
            .update_field(resume_id, ResumeField::JobRole, job_role)
            .await
        {
            warn!(resume_id, error = %e, "failed to persist job role");
        }
    }

    // Location is not part of the module selector; it rides along with the
    // name extractor, which shares its header slice.
    if module == ExtractModule::Name {
        let location = extract::location::extract_location(
            llm,
            resume_text,
            filename,
            Duration::from_secs(config.timeout_location_secs),
        )
        .await;
        if let Err(e) = repo
            .update_field(resume_id, ResumeField::Location, location)
            .await
        {
            warn!(resume_id, error = %e, "failed to persist location");
        }
    }

    if let Err(e) = repo.update_field(resume_id, field, value).await {
        warn!(
            resume_id,
            column = field.column(),
            error = %e,
            "failed to persist extractor result"
        );
    }
}

/// Marks every resume still in flight as failed. Called once, after the
/// shutdown grace period has elapsed.
pub async fn fail_survivors(state: &AppState) {
    let survivors: Vec<i64> = state
        .in_flight
        .lock()
        .expect("in-flight set poisoned")
        .iter()
        .copied()
        .collect();
    if survivors.is_empty() {
        return;
    }
    warn!(count = survivors.len(), "marking in-flight resumes as failed:shutdown");
    let repo = ResumeRepository::new(state.db.clone());
    for resume_id in survivors {
        if let Err(e) = repo
            .update_field(
                resume_id,
                ResumeField::Status,
                Some("failed:shutdown".to_string()),
            )
            .await
        {
            warn!(resume_id, error = %e, "failed to mark resume as failed:shutdown");
        }
    }
}
