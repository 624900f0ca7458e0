use chrono::{DateTime, Utc};
use formwright_core::models::{
    FieldResponse, Submission, SubmissionRecord, SubmissionStatus, SubmitterInfo,
};
use formwright_core::AppError;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use super::page_offset;

const SUBMISSION_COLUMNS: &str = "id, form_id, submitter_ip, submitter_user_agent, submitted_at, \
     responses, status, notes, total_files, total_file_size, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct SubmissionRow {
    id: Uuid,
    form_id: Uuid,
    submitter_ip: Option<String>,
    submitter_user_agent: Option<String>,
    submitted_at: DateTime<Utc>,
    responses: Json<Vec<FieldResponse>>,
    status: SubmissionStatus,
    notes: Option<String>,
    total_files: i32,
    total_file_size: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl SubmissionRow {
    fn into_submission(self) -> Submission {
        Submission {
            id: self.id,
            form_id: self.form_id,
            submitter: SubmitterInfo {
                ip: self.submitter_ip,
                user_agent: self.submitter_user_agent,
                timestamp: self.submitted_at,
            },
            responses: self.responses.0,
            status: self.status,
            notes: self.notes,
            total_files: self.total_files,
            total_file_size: self.total_file_size,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Page of submissions plus the unpaged total
#[derive(Debug)]
pub struct SubmissionPage {
    pub submissions: Vec<Submission>,
    pub total: i64,
}

/// Repository for form submissions
#[derive(Clone)]
pub struct SubmissionRepository {
    pool: PgPool,
}

impl SubmissionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Persist an assembled submission and bump the form's counters in one
    /// transaction
    #[tracing::instrument(
        skip(self, record, submitter),
        fields(db.table = "form_submissions", db.operation = "insert", form_id = %form_id)
    )]
    pub async fn create_with_counter(
        &self,
        form_id: Uuid,
        record: SubmissionRecord,
        submitter: SubmitterInfo,
    ) -> Result<Submission, AppError> {
        let total_files = i32::try_from(record.total_files).map_err(|_| {
            AppError::InvalidInput("Too many files in a single submission".to_string())
        })?;
        let total_file_size = i64::try_from(record.total_file_size).map_err(|_| {
            AppError::InvalidInput("Submission file size is too large".to_string())
        })?;

        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<Postgres, SubmissionRow>(&format!(
            r#"
            INSERT INTO form_submissions (id, form_id, submitter_ip, submitter_user_agent,
                                          submitted_at, responses, status, notes,
                                          total_files, total_file_size)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {}
            "#,
            SUBMISSION_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(form_id)
        .bind(&submitter.ip)
        .bind(&submitter.user_agent)
        .bind(submitter.timestamp)
        .bind(Json(&record.responses))
        .bind(record.status)
        .bind(&record.notes)
        .bind(total_files)
        .bind(total_file_size)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            UPDATE forms
            SET submission_count = submission_count + 1,
                last_submission_at = $2
            WHERE id = $1
            "#,
        )
        .bind(form_id)
        .bind(row.created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(
            submission_id = %row.id,
            form_id = %form_id,
            total_files = row.total_files,
            total_file_size = row.total_file_size,
            "Submission stored"
        );

        Ok(row.into_submission())
    }

    #[tracing::instrument(skip(self), fields(db.table = "form_submissions", db.operation = "select", db.record_id = %id))]
    pub async fn get(&self, id: Uuid) -> Result<Option<Submission>, AppError> {
        let row = sqlx::query_as::<Postgres, SubmissionRow>(&format!(
            "SELECT {} FROM form_submissions WHERE id = $1",
            SUBMISSION_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(SubmissionRow::into_submission))
    }

    /// Newest-first page of a form's submissions, optionally by status
    #[tracing::instrument(skip(self), fields(db.table = "form_submissions", db.operation = "select", form_id = %form_id))]
    pub async fn list_by_form(
        &self,
        form_id: Uuid,
        page: u32,
        limit: u32,
        status: Option<SubmissionStatus>,
    ) -> Result<SubmissionPage, AppError> {
        let rows = sqlx::query_as::<Postgres, SubmissionRow>(&format!(
            r#"
            SELECT {}
            FROM form_submissions
            WHERE form_id = $1
              AND ($2::submission_status IS NULL OR status = $2)
            ORDER BY created_at DESC
            LIMIT $3 OFFSET $4
            "#,
            SUBMISSION_COLUMNS
        ))
        .bind(form_id)
        .bind(status)
        .bind(i64::from(limit))
        .bind(page_offset(page, limit))
        .fetch_all(&self.pool)
        .await?;

        let total = sqlx::query_scalar::<Postgres, i64>(
            r#"
            SELECT COUNT(*)
            FROM form_submissions
            WHERE form_id = $1
              AND ($2::submission_status IS NULL OR status = $2)
            "#,
        )
        .bind(form_id)
        .bind(status)
        .fetch_one(&self.pool)
        .await?;

        Ok(SubmissionPage {
            submissions: rows.into_iter().map(SubmissionRow::into_submission).collect(),
            total,
        })
    }

    /// Set the review status; notes are only replaced when provided
    #[tracing::instrument(skip(self, notes), fields(db.table = "form_submissions", db.operation = "update", db.record_id = %id))]
    pub async fn update_status(
        &self,
        id: Uuid,
        status: SubmissionStatus,
        notes: Option<String>,
    ) -> Result<Option<Submission>, AppError> {
        let row = sqlx::query_as::<Postgres, SubmissionRow>(&format!(
            r#"
            UPDATE form_submissions
            SET status = $2,
                notes = COALESCE($3, notes),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            SUBMISSION_COLUMNS
        ))
        .bind(id)
        .bind(status)
        .bind(&notes)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(SubmissionRow::into_submission))
    }

    /// Delete a submission, returning it so the caller can clean up its files
    #[tracing::instrument(skip(self), fields(db.table = "form_submissions", db.operation = "delete", db.record_id = %id))]
    pub async fn delete(&self, id: Uuid) -> Result<Option<Submission>, AppError> {
        let row = sqlx::query_as::<Postgres, SubmissionRow>(&format!(
            "DELETE FROM form_submissions WHERE id = $1 RETURNING {}",
            SUBMISSION_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(SubmissionRow::into_submission))
    }
}
