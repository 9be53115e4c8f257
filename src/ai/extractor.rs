//! LLM-based extraction: fetch the page as markdown, then ask an
//! OpenAI-compatible endpoint to fill a strict JSON schema. Works for any
//! URL, which is why the service offers it as the universal strategy.

use std::sync::Arc;

use async_trait::async_trait;
use schemars::{schema_for, JsonSchema};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::ai::reader::DocumentConverter;
use crate::core::config::AiConfig;
use crate::core::error::ScrapeError;
use crate::core::types::{
    ExperienceLevel, JobLocation, SalaryRange, ScrapedJob, SourceType, WorkingTime, WorkplaceType,
};

/// The shape the model is asked to produce. Mirrors the canonical record
/// minus the fields the service stamps itself (source URL/type, raw data).
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AiJobPayload {
    pub title: String,
    pub company_name: String,
    pub description: String,
    #[serde(default)]
    pub location: JobLocation,
    #[serde(default)]
    pub required_skills: Vec<String>,
    #[serde(default)]
    pub nice_to_have_skills: Vec<String>,
    #[serde(default)]
    pub workplace_type: Option<WorkplaceType>,
    #[serde(default)]
    pub working_time: Option<WorkingTime>,
    #[serde(default)]
    pub experience_level: Option<ExperienceLevel>,
    #[serde(default)]
    pub salary: Option<Vec<SalaryRange>>,
    #[serde(default)]
    pub languages: Option<Vec<String>>,
    #[serde(default)]
    pub published_at: Option<String>,
}

impl AiJobPayload {
    fn into_job(self, source_url: &str) -> ScrapedJob {
        let mut job = ScrapedJob::empty(source_url, SourceType::Other);
        if !self.title.trim().is_empty() {
            job.title = self.title;
        }
        if !self.company_name.trim().is_empty() {
            job.company_name = self.company_name;
        }
        job.description = self.description;
        job.location = self.location;
        job.required_skills = self.required_skills;
        job.nice_to_have_skills = self.nice_to_have_skills;
        job.workplace_type = self.workplace_type;
        job.working_time = self.working_time;
        job.experience_level = self.experience_level;
        job.salary = self
            .salary
            .map(|ranges| ranges.into_iter().map(SalaryRange::normalized).collect());
        job.languages = self.languages;
        job.published_at = self.published_at;
        job
    }
}

/// OpenAI-compatible structured-output completion.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Run a chat completion constrained to `schema`; returns the raw
    /// message content.
    async fn complete_json(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        model: &str,
        schema: &serde_json::Value,
    ) -> Result<String, ScrapeError>;
}

pub struct OpenAiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl OpenAiClient {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key,
        }
    }
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    async fn complete_json(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        model: &str,
        schema: &serde_json::Value,
    ) -> Result<String, ScrapeError> {
        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));

        let body = serde_json::json!({
            "model": model,
            "temperature": 1,
            "messages": [
                {"role": "system", "content": system_prompt},
                {"role": "user", "content": user_prompt}
            ],
            "response_format": {
                "type": "json_schema",
                "json_schema": {
                    "name": "job_posting",
                    "strict": true,
                    "schema": schema
                }
            }
        });

        let builder = self.client.post(url).json(&body);
        // Only send Authorization when a key is provided. Key-less local
        // endpoints (Ollama / LM Studio) work without it.
        let builder = match self.api_key.as_deref() {
            Some(key) if !key.is_empty() => builder.bearer_auth(key.trim()),
            _ => builder,
        };

        let response = builder
            .send()
            .await
            .map_err(|e| ScrapeError::from_reqwest(e, 120))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ScrapeError::UpstreamService {
                service: "llm",
                status: status.as_u16(),
                message,
            });
        }

        let value: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ScrapeError::from_reqwest(e, 120))?;

        value
            .get("choices")
            .and_then(|v| v.as_array())
            .and_then(|arr| arr.first())
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ScrapeError::SchemaValidation("empty completion content".to_string()))
    }
}

/// A strategy that can extract from any URL.
#[async_trait]
pub trait UniversalScraper: Send + Sync {
    async fn scrape_job(&self, url: &str, model: Option<&str>) -> Result<ScrapedJob, ScrapeError>;
}

const SYSTEM_PROMPT: &str = "You are a job-posting extraction engine. You receive the text of a \
job-offer page and return exactly one JSON object matching the given schema. Use null for fields \
the page does not state. Never invent salary numbers or company names.";

/// The AI pipeline: reader → length gate → truncation → structured completion.
pub struct AiUniversalScraper {
    converter: Arc<dyn DocumentConverter>,
    completion: Arc<dyn CompletionClient>,
    default_model: String,
    max_input_chars: usize,
    min_content_chars: usize,
}

impl AiUniversalScraper {
    pub fn new(
        converter: Arc<dyn DocumentConverter>,
        completion: Arc<dyn CompletionClient>,
        config: &AiConfig,
    ) -> Self {
        Self {
            converter,
            completion,
            default_model: config.resolve_model(),
            max_input_chars: config.resolve_max_input_chars(),
            min_content_chars: config.resolve_min_content_chars(),
        }
    }
}

#[async_trait]
impl UniversalScraper for AiUniversalScraper {
    async fn scrape_job(&self, url: &str, model: Option<&str>) -> Result<ScrapedJob, ScrapeError> {
        let model = model.unwrap_or(&self.default_model);
        info!("ai scrape ({model}): {url}");

        let content = self.converter.to_markdown(url).await?;

        // A body this short is a failed fetch (error page, bot wall), not a
        // job posting. Bail before spending a completion on it.
        let char_count = content.chars().count();
        if char_count < self.min_content_chars {
            return Err(ScrapeError::UpstreamService {
                service: "reader",
                status: 200,
                message: format!(
                    "page content too short to be a job posting ({char_count} chars)"
                ),
            });
        }

        let truncated: String = if char_count > self.max_input_chars {
            debug!("truncating page content: {char_count} -> {} chars", self.max_input_chars);
            content.chars().take(self.max_input_chars).collect()
        } else {
            content
        };

        let schema = serde_json::to_value(schema_for!(AiJobPayload))
            .map_err(|e| ScrapeError::SchemaValidation(e.to_string()))?;
        let user_prompt = format!("Extract the job posting from this page:\n\n{truncated}");

        let raw = self
            .completion
            .complete_json(SYSTEM_PROMPT, &user_prompt, model, &schema)
            .await?;

        let payload: AiJobPayload = serde_json::from_str(strip_code_fences(&raw))
            .map_err(|e| ScrapeError::SchemaValidation(format!("model output rejected: {e}")))?;
        Ok(payload.into_job(url))
    }
}

/// Some models wrap JSON in a markdown fence even under structured output.
fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|s| s.strip_suffix("```"))
        .map(str::trim)
        .unwrap_or(trimmed)
}
