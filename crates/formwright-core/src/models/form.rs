use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::field::{FieldDefinition, FieldType};
use super::schema::FormSchema;

const PUBLIC_ID_LENGTH: usize = 26;
const PUBLIC_ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Generate the shareable identifier used in public form URLs
pub fn generate_public_id() -> String {
    let mut rng = rand::rng();
    (0..PUBLIC_ID_LENGTH)
        .map(|_| PUBLIC_ID_ALPHABET[rng.random_range(0..PUBLIC_ID_ALPHABET.len())] as char)
        .collect()
}

/// Visual theme of the rendered form
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "form_theme", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum FormTheme {
    #[default]
    Default,
    Dark,
    Minimal,
    Colorful,
}

/// Presentation settings owned by the form creator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FormSettings {
    #[serde(default)]
    pub theme: FormTheme,
    #[serde(default = "default_show_progress_bar")]
    pub show_progress_bar: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_url: Option<String>,
}

fn default_show_progress_bar() -> bool {
    true
}

impl Default for FormSettings {
    fn default() -> Self {
        Self {
            theme: FormTheme::default(),
            show_progress_bar: true,
            redirect_url: None,
        }
    }
}

/// Partial settings update; only provided keys overwrite the stored settings.
/// An explicit `null` redirect URL clears it.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct FormSettingsPatch {
    pub theme: Option<FormTheme>,
    pub show_progress_bar: Option<bool>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub redirect_url: Option<Option<String>>,
}

/// `None` for a missing key, `Some(None)` for an explicit `null`
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl FormSettings {
    pub fn merge(mut self, patch: FormSettingsPatch) -> Self {
        if let Some(theme) = patch.theme {
            self.theme = theme;
        }
        if let Some(show) = patch.show_progress_bar {
            self.show_progress_bar = show;
        }
        if let Some(redirect_url) = patch.redirect_url {
            self.redirect_url = redirect_url;
        }
        self
    }
}

/// Persisted form
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Form {
    pub id: Uuid,
    pub public_id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub prompt: String,
    pub fields: Vec<FieldDefinition>,
    pub creator_id: Uuid,
    pub creator_name: String,
    pub is_public: bool,
    pub allow_multiple_submissions: bool,
    pub submission_count: i64,
    pub last_submission_at: Option<DateTime<Utc>>,
    pub settings: FormSettings,
    pub ai_generated_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Form {
    /// Rebuild the validated schema from the stored columns
    pub fn schema(&self) -> Result<FormSchema, crate::error::SchemaError> {
        FormSchema::from_parts(
            self.title.clone(),
            self.description.clone(),
            self.fields.clone(),
        )
    }

    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.creator_id == user_id
    }
}

/// New form produced by generation or duplication
#[derive(Debug, Clone)]
pub struct NewForm {
    pub title: String,
    pub description: Option<String>,
    pub prompt: String,
    pub schema: FormSchema,
    pub creator_id: Uuid,
    pub creator_name: String,
    pub settings: FormSettings,
}

/// Form as shown to people filling it in; no owner-only data
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PublicForm {
    pub id: Uuid,
    pub public_id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub fields: Vec<FieldDefinition>,
    pub settings: FormSettings,
    pub created_at: DateTime<Utc>,
    pub creator_name: String,
}

impl From<Form> for PublicForm {
    fn from(form: Form) -> Self {
        let mut fields = form.fields;
        fields.sort_by_key(|f| f.order);
        Self {
            id: form.id,
            public_id: form.public_id,
            title: form.title,
            description: form.description,
            fields,
            settings: form.settings,
            created_at: form.created_at,
            creator_name: form.creator_name,
        }
    }
}

/// Short form description returned after create/duplicate
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FormSummary {
    pub id: Uuid,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub public_id: String,
    pub created_at: DateTime<Utc>,
}

impl From<&Form> for FormSummary {
    fn from(form: &Form) -> Self {
        Self {
            id: form.id,
            title: form.title.clone(),
            description: form.description.clone(),
            public_id: form.public_id.clone(),
            created_at: form.created_at,
        }
    }
}

/// Request to generate a form from a natural-language description
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct GenerateFormRequest {
    #[serde(default)]
    #[validate(length(min = 1, max = 4000, message = "Please provide a prompt for form generation"))]
    pub prompt: String,
    /// Overrides the generated title
    pub title: Option<String>,
    /// Overrides the generated description
    pub description: Option<String>,
}

/// Request to rework an existing form's fields
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegenerateFormRequest {
    #[serde(default)]
    #[validate(length(min = 1, max = 4000, message = "Please provide a prompt for regeneration"))]
    pub prompt: String,
    pub modifications: Option<String>,
}

/// Owner edits to form metadata
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateFormRequest {
    #[validate(length(min = 1, max = 500))]
    pub title: Option<String>,
    /// `null` removes the description
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    pub is_public: Option<bool>,
    pub allow_multiple_submissions: Option<bool>,
    pub settings: Option<FormSettingsPatch>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct DuplicateFormRequest {
    pub title: Option<String>,
    pub description: Option<String>,
}

/// Paging and search parameters for the owner's form list
#[derive(Debug, Deserialize)]
pub struct FormListQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_form_limit")]
    pub limit: u32,
    #[serde(default)]
    pub search: String,
}

fn default_page() -> u32 {
    1
}

fn default_form_limit() -> u32 {
    10
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FormListResponse {
    pub forms: Vec<Form>,
    pub total_pages: u32,
    pub current_page: u32,
    pub total: i64,
}

/// Per-field response counts
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FieldStat {
    pub field_name: String,
    pub response_count: i64,
    pub field_type: Option<FieldType>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FormAnalytics {
    pub total_submissions: i64,
    /// Submissions received in the last 7 days
    pub recent_submissions: i64,
    pub field_stats: Vec<FieldStat>,
    pub form_created: DateTime<Utc>,
    pub last_submission: Option<DateTime<Utc>>,
}

/// Number of pages needed for `total` rows at `limit` rows per page
pub fn total_pages(total: i64, limit: u32) -> u32 {
    if limit == 0 || total <= 0 {
        return 0;
    }
    ((total as u64).div_ceil(limit as u64)) as u32
}
