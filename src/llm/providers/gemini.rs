//! Google Gemini provider (generateContent REST API)

use crate::llm::{
    config::LlmConfig,
    error::{LlmError, LlmResult},
    providers::LlmProvider as LlmProviderTrait,
    types::{LlmRequest, LlmResponse, Role, TokenUsage},
};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Gemini provider
pub struct GeminiProvider {
    client: Client,
    config: LlmConfig,
}

impl GeminiProvider {
    /// Creates a Gemini provider
    pub fn new(config: LlmConfig) -> LlmResult<Self> {
        config.validate()?;

        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| LlmError::ConfigError(e.to_string()))?;

        Ok(Self { client, config })
    }

    fn build_body(&self, request: &LlmRequest) -> GenerateContentRequest {
        let contents = request
            .messages
            .iter()
            .filter(|m| m.role != Role::System)
            .map(|m| Content {
                role: Some(match m.role {
                    Role::Assistant => "model".to_string(),
                    _ => "user".to_string(),
                }),
                parts: vec![Part {
                    text: m.content.clone(),
                }],
            })
            .collect();

        GenerateContentRequest {
            contents,
            system_instruction: request.system_text().map(|text| Content {
                role: None,
                parts: vec![Part { text }],
            }),
            generation_config: GenerationConfig {
                temperature: request
                    .temperature
                    .unwrap_or(self.config.default_temperature),
                max_output_tokens: request
                    .max_tokens
                    .unwrap_or(self.config.default_max_tokens),
            },
        }
    }

    /// Pulls the text of the first candidate out of a response
    fn extract(response: GenerateContentResponse, model: String) -> LlmResult<LlmResponse> {
        let candidate = response
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::EmptyResponse("Gemini".to_string()))?;

        let content: String = candidate
            .content
            .map(|c| c.parts.into_iter().map(|p| p.text).collect())
            .unwrap_or_default();

        if content.trim().is_empty() {
            return Err(LlmError::EmptyResponse("Gemini".to_string()));
        }

        let usage = response
            .usage_metadata
            .map(|u| TokenUsage::new(u.prompt_token_count, u.candidates_token_count))
            .unwrap_or_default();

        Ok(LlmResponse {
            content,
            model,
            usage,
            finish_reason: candidate.finish_reason,
        })
    }
}

#[async_trait]
impl LlmProviderTrait for GeminiProvider {
    async fn complete(&self, request: &LlmRequest) -> LlmResult<LlmResponse> {
        let model = request
            .model
            .clone()
            .unwrap_or_else(|| self.config.default_model.clone());

        let api_key = self
            .config
            .get_api_key()
            .ok_or_else(|| LlmError::ConfigError("API key is required".to_string()))?;

        let response = self
            .client
            .post(format!(
                "{}/models/{}:generateContent",
                self.config.base_url(),
                model
            ))
            .header("x-goog-api-key", api_key)
            .json(&self.build_body(request))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::Timeout(self.config.timeout_secs)
                } else {
                    LlmError::from(e)
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(LlmError::from_status(status, error_text));
        }

        let body: GenerateContentResponse = response.json().await?;
        Self::extract(body, model)
    }

    fn name(&self) -> &str {
        "Gemini"
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: usize,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: usize,
    #[serde(default)]
    candidates_token_count: usize,
}
