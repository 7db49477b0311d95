//! Generation client — the single point of entry for all text-generation
//! calls in Resumake.
//!
//! ARCHITECTURAL RULE: no other module may call the generation API directly.
//! The client transmits the target schema as a formatting instruction
//! (best-effort bias, not enforcement) and classifies failures into the
//! pipeline's error taxonomy. It never validates JSON itself — that is the
//! orchestrator's job.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::optimizer::schema::{FieldCategory, SchemaNode};

pub mod prompts;

const OPENROUTER_API_URL: &str = "https://openrouter.ai/api/v1/chat/completions";
/// The model used for all generation calls in Resumake.
/// Intentionally hardcoded to prevent accidental drift.
pub const MODEL: &str = "meta-llama/llama-3-8b-instruct:free";

/// Failure taxonomy for one generation call. Every kind is caught at the
/// smallest possible scope and converted into a fallback substitution —
/// none of them ever reaches the orchestrator's caller.
#[derive(Debug, Clone, Error)]
pub enum GenerationError {
    #[error("response could not be parsed: {0}")]
    Parse(String),

    #[error("generated content failed validation: {0}")]
    Validation(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("network error: {0}")]
    Network(String),
}

/// Generation parameters, fixed per field category.
#[derive(Debug, Clone, Copy)]
pub struct GenerationParams {
    pub temperature: f32,
    pub top_p: f32,
    pub frequency_penalty: f32,
    pub presence_penalty: f32,
    pub max_tokens: u32,
}

impl GenerationParams {
    pub fn for_category(category: FieldCategory) -> Self {
        let max_tokens = match category {
            FieldCategory::Summary => 600,
            FieldCategory::Experience => 800,
            FieldCategory::Skills => 500,
        };
        Self {
            temperature: 0.7,
            top_p: 0.8,
            frequency_penalty: 0.2,
            presence_penalty: 0.1,
            max_tokens,
        }
    }
}

/// The external text-generation capability. Implemented by [`LlmClient`] in
/// production and by scripted stubs in pipeline tests.
#[async_trait]
pub trait GenerationService: Send + Sync {
    /// One attempt, no retries — the per-field fallback is the recovery
    /// mechanism. Returns the raw response text.
    async fn generate(
        &self,
        prompt: &str,
        schema: &SchemaNode,
        params: &GenerationParams,
    ) -> Result<String, GenerationError>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    top_p: f32,
    frequency_penalty: f32,
    presence_penalty: f32,
    max_tokens: u32,
    stream: bool,
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    content: Option<String>,
}

/// The production generation client, backed by the OpenRouter chat API.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
    referer: String,
}

impl LlmClient {
    pub fn new(api_key: String, referer: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
            referer,
        }
    }
}

#[async_trait]
impl GenerationService for LlmClient {
    async fn generate(
        &self,
        prompt: &str,
        schema: &SchemaNode,
        params: &GenerationParams,
    ) -> Result<String, GenerationError> {
        let system = prompts::system_instruction(schema);
        let request_body = ChatRequest {
            model: MODEL,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &system,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: params.temperature,
            top_p: params.top_p,
            frequency_penalty: params.frequency_penalty,
            presence_penalty: params.presence_penalty,
            max_tokens: params.max_tokens,
            stream: false,
            response_format: ResponseFormat {
                format_type: "json_object",
            },
        };

        let response = self
            .client
            .post(OPENROUTER_API_URL)
            .bearer_auth(&self.api_key)
            .header("HTTP-Referer", &self.referer)
            .header("X-Title", "Resumake")
            .json(&request_body)
            .send()
            .await
            .map_err(|e| GenerationError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(GenerationError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| GenerationError::Network(e.to_string()))?;
        let parsed: ChatResponse = serde_json::from_str(&body)
            .map_err(|e| GenerationError::Parse(format!("unexpected response shape: {e}")))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| {
                GenerationError::Parse("response contained no message content".to_string())
            })?;

        debug!(chars = content.len(), "generation call succeeded");
        Ok(content)
    }
}
