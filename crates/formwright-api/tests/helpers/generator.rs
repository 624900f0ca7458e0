use async_trait::async_trait;
use formwright_core::models::FieldDefinition;
use formwright_core::AppError;
use formwright_services::SchemaGenerator;
use serde_json::json;

/// Generator returning fixed model output
pub struct CannedGenerator {
    generated: String,
    regenerated: String,
}

impl CannedGenerator {
    pub fn new(generated: impl Into<String>, regenerated: impl Into<String>) -> Self {
        Self {
            generated: generated.into(),
            regenerated: regenerated.into(),
        }
    }

    /// Job application form: required name, email, age >= 18, optional resume upload
    pub fn contact_form() -> Self {
        let generated = json!({
            "title": "Job Application",
            "description": "Apply for the open position",
            "fields": [
                { "name": "full_name", "label": "Full name", "type": "text", "required": true, "order": 1 },
                { "name": "email", "label": "Email", "type": "email", "required": true, "order": 2 },
                {
                    "name": "age", "label": "Age", "type": "number", "order": 3,
                    "validation": { "min": 18 }
                },
                {
                    "name": "resume", "label": "Resume", "type": "file", "order": 4,
                    "fileConfig": { "accept": ".pdf", "multiple": false }
                }
            ]
        });
        let regenerated = json!({
            "fields": [
                { "name": "full_name", "label": "Full name", "type": "text", "required": true, "order": 1 },
                { "name": "phone", "label": "Phone", "type": "tel", "order": 2 }
            ]
        });

        Self::new(
            format!("Here is your form:\n```json\n{}\n```", generated),
            regenerated.to_string(),
        )
    }
}

#[async_trait]
impl SchemaGenerator for CannedGenerator {
    fn model_name(&self) -> &str {
        "canned"
    }

    async fn generate(&self, _request: &str) -> Result<String, AppError> {
        Ok(self.generated.clone())
    }

    async fn regenerate(
        &self,
        _existing: &[FieldDefinition],
        _request: &str,
        _modifications: Option<&str>,
    ) -> Result<String, AppError> {
        Ok(self.regenerated.clone())
    }
}

/// Generator whose upstream call always fails
pub struct FailingGenerator;

#[async_trait]
impl SchemaGenerator for FailingGenerator {
    fn model_name(&self) -> &str {
        "failing"
    }

    async fn generate(&self, _request: &str) -> Result<String, AppError> {
        Err(AppError::Upstream("model unavailable".to_string()))
    }

    async fn regenerate(
        &self,
        _existing: &[FieldDefinition],
        _request: &str,
        _modifications: Option<&str>,
    ) -> Result<String, AppError> {
        Err(AppError::Upstream("model unavailable".to_string()))
    }
}
