//! Generative backend client

use crate::llm::{
    config::LlmConfig,
    error::LlmResult,
    providers::{create_provider, LlmProvider},
    types::{LlmRequest, LlmResponse, Message},
};

/// Client wrapping one configured provider
pub struct LlmClient {
    provider: Box<dyn LlmProvider>,
    config: LlmConfig,
}

impl LlmClient {
    /// Creates a client for the configured provider
    pub fn new(config: LlmConfig) -> LlmResult<Self> {
        config.validate()?;
        let provider = create_provider(&config)?;

        Ok(Self { provider, config })
    }

    /// Creates a client around an existing provider
    pub fn with_provider(config: LlmConfig, provider: Box<dyn LlmProvider>) -> Self {
        Self { provider, config }
    }

    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    /// Sends a completion request
    pub async fn complete(&self, request: LlmRequest) -> LlmResult<LlmResponse> {
        self.provider.complete(&request).await
    }

    /// Completion with a system prompt
    pub async fn complete_with_system(
        &self,
        system_prompt: impl Into<String>,
        user_prompt: impl Into<String>,
    ) -> LlmResult<String> {
        let request = LlmRequest::new(vec![
            Message::system(system_prompt),
            Message::user(user_prompt),
        ])
        .with_model(self.config.default_model.clone())
        .with_temperature(self.config.default_temperature)
        .with_max_tokens(self.config.default_max_tokens);

        let response = self.complete(request).await?;
        Ok(response.content)
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }
}
