//! Google Gemini client for form schema generation

use anyhow::{Context, Result};
use async_trait::async_trait;
use formwright_core::models::FieldDefinition;
use formwright_core::{AppError, Config};
use serde::Deserialize;
use serde_json::json;
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::time::Duration;

use super::prompts::{generation_prompt, regeneration_prompt};
use super::SchemaGenerator;

pub struct GeminiGenerator {
    http_client: reqwest::Client,
    api_key: String,
    model: String,
    api_base: String,
}

impl Debug for GeminiGenerator {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("GeminiGenerator")
            .field("model", &self.model)
            .field("api_base", &self.api_base)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

impl GeminiGenerator {
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        api_base: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client for Gemini API")?;

        Ok(Self {
            http_client,
            api_key: api_key.into(),
            model: model.into(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            config.gemini_api_key(),
            config.gemini_model(),
            config.gemini_api_base(),
            Duration::from_secs(config.ai_timeout_secs()),
        )
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.api_base, self.model)
    }

    /// Send one prompt and return the concatenated text of the first candidate
    async fn generate_content(&self, prompt: &str) -> Result<String, AppError> {
        let start = std::time::Instant::now();

        let request_body = json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": prompt }]
            }]
        });

        let response = self
            .http_client
            .post(self.endpoint())
            .query(&[("key", self.api_key.as_str())])
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, model = %self.model, "Gemini API request failed");
                AppError::Upstream("Failed to reach the AI service".to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::error!(
                status = %status,
                model = %self.model,
                body = %error_text,
                "Gemini API returned an error"
            );
            if error_text.contains("API_KEY_INVALID") {
                return Err(AppError::Upstream(
                    "AI service configuration error: check the Gemini API key".to_string(),
                ));
            }
            return Err(AppError::Upstream(format!(
                "AI service request failed with status {}",
                status.as_u16()
            )));
        }

        let body: GenerateContentResponse = response.json().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to parse Gemini API response");
            AppError::Upstream("AI service returned an unreadable response".to_string())
        })?;

        let text: String = body
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(AppError::Upstream(
                "AI service returned no content".to_string(),
            ));
        }

        tracing::debug!(
            model = %self.model,
            response_len = text.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Gemini generation complete"
        );

        Ok(text)
    }
}

#[async_trait]
impl SchemaGenerator for GeminiGenerator {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, request: &str) -> Result<String, AppError> {
        self.generate_content(&generation_prompt(request)).await
    }

    async fn regenerate(
        &self,
        existing: &[FieldDefinition],
        request: &str,
        modifications: Option<&str>,
    ) -> Result<String, AppError> {
        self.generate_content(&regeneration_prompt(existing, request, modifications))
            .await
    }
}
