//! Resume Repository — single-row reads and partial updates over a fixed
//! column whitelist.
//!
//! Every update is its own short transaction so one failing extractor never
//! rolls back a concurrent one, and NOT-NULL violations are rejected here,
//! synchronously, before any SQL is generated. PostgreSQL deadlocks are
//! retried with exponential backoff.

use sqlx::{PgPool, QueryBuilder};
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

use crate::models::resume::ResumeRow;

const DEADLOCK_MAX_RETRIES: u32 = 3;
const DEADLOCK_BASE_DELAY: Duration = Duration::from_millis(100);

/// The updatable columns. Read-only columns (id, created_at, updated_at) are
/// not representable here, so they can never be touched by an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResumeField {
    Filename,
    ResumeText,
    MasterCategory,
    Category,
    CandidateName,
    Designation,
    JobRole,
    Experience,
    Domain,
    Mobile,
    Email,
    Education,
    Location,
    Skillset,
    Status,
}

impl ResumeField {
    pub fn column(&self) -> &'static str {
        match self {
            ResumeField::Filename => "filename",
            ResumeField::ResumeText => "resume_text",
            ResumeField::MasterCategory => "mastercategory",
            ResumeField::Category => "category",
            ResumeField::CandidateName => "candidatename",
            ResumeField::Designation => "designation",
            ResumeField::JobRole => "jobrole",
            ResumeField::Experience => "experience",
            ResumeField::Domain => "domain",
            ResumeField::Mobile => "mobile",
            ResumeField::Email => "email",
            ResumeField::Education => "education",
            ResumeField::Location => "location",
            ResumeField::Skillset => "skillset",
            ResumeField::Status => "status",
        }
    }

    /// Filename is the only NOT NULL extractable column.
    pub fn nullable(&self) -> bool {
        !matches!(self, ResumeField::Filename)
    }
}

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("column '{0}' cannot be set to null or empty (NOT NULL constraint)")]
    NotNull(&'static str),

    #[error("resume {0} not found")]
    NotFound(i64),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// NOT-NULL pre-validation. Fails loudly before the database sees anything.
pub fn validate_update(updates: &[(ResumeField, Option<String>)]) -> Result<(), RepoError> {
    for (field, value) in updates {
        if field.nullable() {
            continue;
        }
        match value {
            Some(v) if !v.trim().is_empty() => {}
            _ => return Err(RepoError::NotNull(field.column())),
        }
    }
    Ok(())
}

/// PostgreSQL deadlock (40P01) or serialization failure (40001).
fn is_deadlock(error: &sqlx::Error) -> bool {
    match error {
        sqlx::Error::Database(db) => db
            .code()
            .map(|code| code == "40P01" || code == "40001")
            .unwrap_or(false),
        _ => false,
    }
}

pub struct ResumeRepository {
    pool: PgPool,
}

impl ResumeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates a resume row with status "pending" and returns it.
    pub async fn create(&self, filename: &str) -> Result<ResumeRow, RepoError> {
        if filename.trim().is_empty() {
            return Err(RepoError::NotNull("filename"));
        }
        let row = sqlx::query_as::<_, ResumeRow>(
            "INSERT INTO resume_metadata (filename, status, indexed_flag, created_at, updated_at) \
             VALUES ($1, 'pending', 0, NOW(), NOW()) RETURNING *",
        )
        .bind(filename)
        .fetch_one(&self.pool)
        .await?;
        info!(resume_id = row.id, file_name = filename, "created resume record");
        Ok(row)
    }

    pub async fn get_by_id(&self, resume_id: i64) -> Result<Option<ResumeRow>, RepoError> {
        Ok(sqlx::query_as::<_, ResumeRow>(
            "SELECT * FROM resume_metadata WHERE id = $1",
        )
        .bind(resume_id)
        .fetch_optional(&self.pool)
        .await?)
    }

    /// Map-form read for background tasks: a plain JSON object with no row
    /// struct to go stale across an await point.
    pub async fn get_by_id_map(
        &self,
        resume_id: i64,
    ) -> Result<Option<serde_json::Value>, RepoError> {
        let row = self.get_by_id(resume_id).await?;
        Ok(row.map(|r| serde_json::to_value(r).expect("resume row serializes")))
    }

    /// Duplicate-upload detection.
    pub async fn get_by_filename(&self, filename: &str) -> Result<Option<ResumeRow>, RepoError> {
        Ok(sqlx::query_as::<_, ResumeRow>(
            "SELECT * FROM resume_metadata WHERE filename = $1",
        )
        .bind(filename)
        .fetch_optional(&self.pool)
        .await?)
    }

    /// Partial update over whitelisted columns. Each call is one short
    /// transaction; deadlocks retry up to 3 times with exponential backoff.
    pub async fn update(
        &self,
        resume_id: i64,
        updates: &[(ResumeField, Option<String>)],
    ) -> Result<(), RepoError> {
        if updates.is_empty() {
            warn!(resume_id, "update called with no columns");
            return Ok(());
        }
        validate_update(updates)?;

        let mut attempt = 0u32;
        loop {
            let mut builder: QueryBuilder<sqlx::Postgres> =
                QueryBuilder::new("UPDATE resume_metadata SET updated_at = NOW()");
            for (field, value) in updates {
                builder.push(", ");
                builder.push(field.column());
                builder.push(" = ");
                builder.push_bind(value.clone());
            }
            builder.push(" WHERE id = ");
            builder.push_bind(resume_id);

            match builder.build().execute(&self.pool).await {
                Ok(result) => {
                    if result.rows_affected() == 0 {
                        return Err(RepoError::NotFound(resume_id));
                    }
                    info!(
                        resume_id,
                        columns = ?updates.iter().map(|(f, _)| f.column()).collect::<Vec<_>>(),
                        "updated resume record"
                    );
                    return Ok(());
                }
                Err(e) if is_deadlock(&e) && attempt < DEADLOCK_MAX_RETRIES => {
                    let delay = DEADLOCK_BASE_DELAY * 2u32.pow(attempt);
                    warn!(
                        resume_id,
                        attempt = attempt + 1,
                        ?delay,
                        "database deadlock detected, retrying"
                    );
                    attempt += 1;
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Convenience for the per-extractor single-column write.
    pub async fn update_field(
        &self,
        resume_id: i64,
        field: ResumeField,
        value: Option<String>,
    ) -> Result<(), RepoError> {
        self.update(resume_id, &[(field, value)]).await
    }

    /// Rows eligible for vector indexing: text and mastercategory present,
    /// and (unless forced) not yet indexed.
    pub async fn pending_index_candidates(
        &self,
        limit: Option<i64>,
        resume_ids: Option<&[i64]>,
        force: bool,
    ) -> Result<Vec<ResumeRow>, RepoError> {
        let mut builder: QueryBuilder<sqlx::Postgres> = QueryBuilder::new(
            "SELECT * FROM resume_metadata \
             WHERE resume_text IS NOT NULL AND mastercategory IS NOT NULL",
        );
        if !force {
            builder.push(" AND (indexed_flag = 0 OR indexed_flag IS NULL)");
        }
        if let Some(ids) = resume_ids {
            builder.push(" AND id = ANY(");
            builder.push_bind(ids.to_vec());
            builder.push(")");
        }
        builder.push(" ORDER BY id");
        if let Some(limit) = limit {
            builder.push(" LIMIT ");
            builder.push_bind(limit);
        }

        Ok(builder
            .build_query_as::<ResumeRow>()
            .fetch_all(&self.pool)
            .await?)
    }

    /// Flips the indexed flag. 1 means "the full vector set for this resume
    /// is durable in the vector store"; only the indexer may set it.
    pub async fn set_indexed_flag(&self, resume_id: i64, flag: i32) -> Result<(), RepoError> {
        let mut attempt = 0u32;
        loop {
            let result = sqlx::query(
                "UPDATE resume_metadata SET indexed_flag = $1, updated_at = NOW() WHERE id = $2",
            )
            .bind(flag)
            .bind(resume_id)
            .execute(&self.pool)
            .await;

            match result {
                Ok(done) => {
                    if done.rows_affected() == 0 {
                        return Err(RepoError::NotFound(resume_id));
                    }
                    info!(resume_id, indexed_flag = flag, "updated indexed flag");
                    return Ok(());
                }
                Err(e) if is_deadlock(&e) && attempt < DEADLOCK_MAX_RETRIES => {
                    let delay = DEADLOCK_BASE_DELAY * 2u32.pow(attempt);
                    warn!(resume_id, attempt = attempt + 1, ?delay, "deadlock on flag update, retrying");
                    attempt += 1;
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rejects_null_filename() {
        let updates = vec![(ResumeField::Filename, None)];
        assert!(matches!(
            validate_update(&updates),
            Err(RepoError::NotNull("filename"))
        ));
    }

    #[test]
    fn test_validate_rejects_empty_filename() {
        let updates = vec![(ResumeField::Filename, Some("   ".to_string()))];
        assert!(validate_update(&updates).is_err());
    }

    #[test]
    fn test_validate_allows_null_for_nullable_columns() {
        let updates = vec![
            (ResumeField::Skillset, None),
            (ResumeField::Domain, None),
            (ResumeField::CandidateName, Some("Jane".to_string())),
        ];
        assert!(validate_update(&updates).is_ok());
    }

    #[test]
    fn test_validate_passes_nonempty_filename() {
        let updates = vec![(ResumeField::Filename, Some("cv.pdf".to_string()))];
        assert!(validate_update(&updates).is_ok());
    }

    #[test]
    fn test_only_filename_is_not_nullable() {
        let all = [
            ResumeField::Filename,
            ResumeField::ResumeText,
            ResumeField::MasterCategory,
            ResumeField::Category,
            ResumeField::CandidateName,
            ResumeField::Designation,
            ResumeField::JobRole,
            ResumeField::Experience,
            ResumeField::Domain,
            ResumeField::Mobile,
            ResumeField::Email,
            ResumeField::Education,
            ResumeField::Location,
            ResumeField::Skillset,
            ResumeField::Status,
        ];
        for field in all {
            assert_eq!(field.nullable(), field != ResumeField::Filename, "{field:?}");
        }
    }

    #[test]
    fn test_column_names_match_schema() {
        assert_eq!(ResumeField::MasterCategory.column(), "mastercategory");
        assert_eq!(ResumeField::CandidateName.column(), "candidatename");
        assert_eq!(ResumeField::JobRole.column(), "jobrole");
        assert_eq!(ResumeField::ResumeText.column(), "resume_text");
    }
}
