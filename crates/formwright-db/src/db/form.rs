use chrono::{DateTime, Utc};
use formwright_core::models::{
    generate_public_id, FieldDefinition, FieldStat, FieldType, Form, FormAnalytics, FormSchema,
    FormSettings, FormSettingsPatch, FormTheme, NewForm,
};
use formwright_core::AppError;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use super::page_offset;

const FORM_COLUMNS: &str = "id, public_id, title, description, prompt, fields, creator_id, \
     creator_name, is_public, allow_multiple_submissions, submission_count, last_submission_at, \
     theme, show_progress_bar, redirect_url, ai_generated_at, created_at, updated_at";

/// Row type for the forms table
#[derive(Debug, sqlx::FromRow)]
struct FormRow {
    id: Uuid,
    public_id: String,
    title: String,
    description: Option<String>,
    prompt: String,
    fields: Json<Vec<FieldDefinition>>,
    creator_id: Uuid,
    creator_name: String,
    is_public: bool,
    allow_multiple_submissions: bool,
    submission_count: i64,
    last_submission_at: Option<DateTime<Utc>>,
    theme: FormTheme,
    show_progress_bar: bool,
    redirect_url: Option<String>,
    ai_generated_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl FormRow {
    fn into_form(self) -> Form {
        Form {
            id: self.id,
            public_id: self.public_id,
            title: self.title,
            description: self.description,
            prompt: self.prompt,
            fields: self.fields.0,
            creator_id: self.creator_id,
            creator_name: self.creator_name,
            is_public: self.is_public,
            allow_multiple_submissions: self.allow_multiple_submissions,
            submission_count: self.submission_count,
            last_submission_at: self.last_submission_at,
            settings: FormSettings {
                theme: self.theme,
                show_progress_bar: self.show_progress_bar,
                redirect_url: self.redirect_url,
            },
            ai_generated_at: self.ai_generated_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Owner edits applied by [`FormRepository::update_settings`]
#[derive(Debug, Default, Clone)]
pub struct FormUpdate {
    pub title: Option<String>,
    /// `Some(None)` clears the description
    pub description: Option<Option<String>>,
    pub is_public: Option<bool>,
    pub allow_multiple_submissions: Option<bool>,
    pub settings: Option<FormSettingsPatch>,
}

/// Page of forms plus the unpaged total
#[derive(Debug)]
pub struct FormPage {
    pub forms: Vec<Form>,
    pub total: i64,
}

/// Split a nullable patch value into (provided, new value)
fn nullable_column(value: Option<Option<String>>) -> (bool, Option<String>) {
    match value {
        Some(value) => (true, value),
        None => (false, None),
    }
}

/// `%term%` with LIKE metacharacters escaped
fn like_pattern(search: &str) -> Option<String> {
    let term = search.trim();
    if term.is_empty() {
        return None;
    }
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    Some(format!("%{}%", escaped))
}

/// Repository for forms
#[derive(Clone)]
pub struct FormRepository {
    pool: PgPool,
}

impl FormRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new form with a fresh public id
    #[tracing::instrument(skip(self, new_form), fields(db.table = "forms", db.operation = "insert"))]
    pub async fn create(&self, new_form: NewForm) -> Result<Form, AppError> {
        let NewForm {
            title,
            description,
            prompt,
            schema,
            creator_id,
            creator_name,
            settings,
        } = new_form;

        let row = sqlx::query_as::<Postgres, FormRow>(&format!(
            r#"
            INSERT INTO forms (id, public_id, title, description, prompt, fields, creator_id,
                               creator_name, theme, show_progress_bar, redirect_url)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {}
            "#,
            FORM_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(generate_public_id())
        .bind(&title)
        .bind(&description)
        .bind(&prompt)
        .bind(Json(schema.into_fields()))
        .bind(creator_id)
        .bind(&creator_name)
        .bind(settings.theme)
        .bind(settings.show_progress_bar)
        .bind(&settings.redirect_url)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(form_id = %row.id, public_id = %row.public_id, "Form created");

        Ok(row.into_form())
    }

    #[tracing::instrument(skip(self), fields(db.table = "forms", db.operation = "select", db.record_id = %id))]
    pub async fn get(&self, id: Uuid) -> Result<Option<Form>, AppError> {
        let row = sqlx::query_as::<Postgres, FormRow>(&format!(
            "SELECT {} FROM forms WHERE id = $1",
            FORM_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(FormRow::into_form))
    }

    #[tracing::instrument(skip(self), fields(db.table = "forms", db.operation = "select"))]
    pub async fn get_by_public_id(&self, public_id: &str) -> Result<Option<Form>, AppError> {
        let row = sqlx::query_as::<Postgres, FormRow>(&format!(
            "SELECT {} FROM forms WHERE public_id = $1",
            FORM_COLUMNS
        ))
        .bind(public_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(FormRow::into_form))
    }

    /// Newest-first page of a creator's forms, optionally filtered by a
    /// case-insensitive match on title or description
    #[tracing::instrument(skip(self), fields(db.table = "forms", db.operation = "select"))]
    pub async fn list_by_creator(
        &self,
        creator_id: Uuid,
        page: u32,
        limit: u32,
        search: &str,
    ) -> Result<FormPage, AppError> {
        let pattern = like_pattern(search);

        let rows = sqlx::query_as::<Postgres, FormRow>(&format!(
            r#"
            SELECT {}
            FROM forms
            WHERE creator_id = $1
              AND ($2::text IS NULL OR title ILIKE $2 OR description ILIKE $2)
            ORDER BY created_at DESC
            LIMIT $3 OFFSET $4
            "#,
            FORM_COLUMNS
        ))
        .bind(creator_id)
        .bind(&pattern)
        .bind(i64::from(limit))
        .bind(page_offset(page, limit))
        .fetch_all(&self.pool)
        .await?;

        let total = sqlx::query_scalar::<Postgres, i64>(
            r#"
            SELECT COUNT(*)
            FROM forms
            WHERE creator_id = $1
              AND ($2::text IS NULL OR title ILIKE $2 OR description ILIKE $2)
            "#,
        )
        .bind(creator_id)
        .bind(&pattern)
        .fetch_one(&self.pool)
        .await?;

        Ok(FormPage {
            forms: rows.into_iter().map(FormRow::into_form).collect(),
            total,
        })
    }

    /// Apply owner edits; keys not provided keep their stored value, while an
    /// explicit `None` description or redirect URL clears the column
    #[tracing::instrument(skip(self, update), fields(db.table = "forms", db.operation = "update", db.record_id = %id))]
    pub async fn update_settings(&self, id: Uuid, update: FormUpdate) -> Result<Option<Form>, AppError> {
        let settings = update.settings.unwrap_or_default();
        let (set_description, description) = nullable_column(update.description);
        let (set_redirect_url, redirect_url) = nullable_column(settings.redirect_url);

        let row = sqlx::query_as::<Postgres, FormRow>(&format!(
            r#"
            UPDATE forms
            SET title = COALESCE($2, title),
                description = CASE WHEN $3 THEN $4 ELSE description END,
                is_public = COALESCE($5, is_public),
                allow_multiple_submissions = COALESCE($6, allow_multiple_submissions),
                theme = COALESCE($7, theme),
                show_progress_bar = COALESCE($8, show_progress_bar),
                redirect_url = CASE WHEN $9 THEN $10 ELSE redirect_url END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            FORM_COLUMNS
        ))
        .bind(id)
        .bind(&update.title)
        .bind(set_description)
        .bind(description)
        .bind(update.is_public)
        .bind(update.allow_multiple_submissions)
        .bind(settings.theme)
        .bind(settings.show_progress_bar)
        .bind(set_redirect_url)
        .bind(redirect_url)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(FormRow::into_form))
    }

    /// Replace the field list after regeneration
    #[tracing::instrument(skip(self, schema), fields(db.table = "forms", db.operation = "update", db.record_id = %id))]
    pub async fn replace_fields(
        &self,
        id: Uuid,
        schema: FormSchema,
        prompt: &str,
    ) -> Result<Option<Form>, AppError> {
        let row = sqlx::query_as::<Postgres, FormRow>(&format!(
            r#"
            UPDATE forms
            SET fields = $2,
                prompt = $3,
                ai_generated_at = NOW(),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            FORM_COLUMNS
        ))
        .bind(id)
        .bind(Json(schema.into_fields()))
        .bind(prompt)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(FormRow::into_form))
    }

    /// Delete a form; its submissions go with it (ON DELETE CASCADE)
    #[tracing::instrument(skip(self), fields(db.table = "forms", db.operation = "delete", db.record_id = %id))]
    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM forms WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Copy a form under a new id and public id; counters start at zero
    #[tracing::instrument(skip(self, original), fields(db.table = "forms", db.operation = "insert", db.record_id = %original.id))]
    pub async fn duplicate(
        &self,
        original: &Form,
        creator_id: Uuid,
        creator_name: &str,
        title: Option<String>,
        description: Option<String>,
    ) -> Result<Form, AppError> {
        let title = title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| format!("{} (Copy)", original.title));
        let description = description
            .filter(|d| !d.trim().is_empty())
            .or_else(|| original.description.clone());

        let schema = original.schema()?.retitled(title, description)?;

        self.create(NewForm {
            title: schema.title().to_string(),
            description: schema.description().map(String::from),
            prompt: original.prompt.clone(),
            schema,
            creator_id,
            creator_name: creator_name.to_string(),
            settings: original.settings.clone(),
        })
        .await
    }

    /// Submission counts and per-field response statistics
    #[tracing::instrument(skip(self, form), fields(db.table = "form_submissions", db.operation = "select", db.record_id = %form.id))]
    pub async fn analytics(&self, form: &Form) -> Result<FormAnalytics, AppError> {
        let total_submissions = sqlx::query_scalar::<Postgres, i64>(
            "SELECT COUNT(*) FROM form_submissions WHERE form_id = $1",
        )
        .bind(form.id)
        .fetch_one(&self.pool)
        .await?;

        let recent_submissions = sqlx::query_scalar::<Postgres, i64>(
            r#"
            SELECT COUNT(*)
            FROM form_submissions
            WHERE form_id = $1 AND created_at >= NOW() - INTERVAL '7 days'
            "#,
        )
        .bind(form.id)
        .fetch_one(&self.pool)
        .await?;

        let stats = sqlx::query_as::<Postgres, (String, i64, Option<String>)>(
            r#"
            SELECT r->>'fieldName' AS field_name,
                   COUNT(*) AS response_count,
                   MIN(r->>'fieldType') AS field_type
            FROM form_submissions s
            CROSS JOIN LATERAL jsonb_array_elements(s.responses) AS r
            WHERE s.form_id = $1
            GROUP BY r->>'fieldName'
            ORDER BY r->>'fieldName'
            "#,
        )
        .bind(form.id)
        .fetch_all(&self.pool)
        .await?;

        let field_stats = stats
            .into_iter()
            .map(|(field_name, response_count, field_type)| FieldStat {
                field_name,
                response_count,
                field_type: field_type.and_then(|t| {
                    serde_json::from_value::<FieldType>(serde_json::Value::String(t)).ok()
                }),
            })
            .collect();

        Ok(FormAnalytics {
            total_submissions,
            recent_submissions,
            field_stats,
            form_created: form.created_at,
            last_submission: form.last_submission_at,
        })
    }
}
