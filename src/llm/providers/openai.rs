//! OpenAI-compatible chat completions provider

use crate::llm::{
    config::LlmConfig,
    error::{LlmError, LlmResult},
    providers::LlmProvider as LlmProviderTrait,
    types::{LlmRequest, LlmResponse, Message, TokenUsage},
};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// OpenAI provider
pub struct OpenAIProvider {
    client: Client,
    config: LlmConfig,
}

impl OpenAIProvider {
    /// Creates an OpenAI provider
    pub fn new(config: LlmConfig) -> LlmResult<Self> {
        config.validate()?;

        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| LlmError::ConfigError(e.to_string()))?;

        Ok(Self { client, config })
    }

    fn build_body<'a>(&'a self, request: &'a LlmRequest, model: &'a str) -> ChatCompletionRequest<'a> {
        ChatCompletionRequest {
            model,
            messages: &request.messages,
            temperature: request
                .temperature
                .unwrap_or(self.config.default_temperature),
            max_tokens: request
                .max_tokens
                .unwrap_or(self.config.default_max_tokens),
        }
    }
}

#[async_trait]
impl LlmProviderTrait for OpenAIProvider {
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
            .post(format!("{}/chat/completions", self.config.base_url()))
            .bearer_auth(api_key)
            .json(&self.build_body(request, &model))
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

        let body: ChatCompletionResponse = response.json().await?;

        let choice = body
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::ApiError("No choices in response".to_string()))?;

        let usage = body
            .usage
            .map(|u| TokenUsage::new(u.prompt_tokens, u.completion_tokens))
            .unwrap_or_default();

        Ok(LlmResponse {
            content: choice.message.content.unwrap_or_default(),
            model: body.model.unwrap_or(model),
            usage,
            finish_reason: choice.finish_reason,
        })
    }

    fn name(&self) -> &str {
        "OpenAI"
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    temperature: f32,
    max_tokens: usize,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: usize,
    completion_tokens: usize,
}
