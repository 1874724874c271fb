//! Generative backend implementations

pub mod gemini;
pub mod openai;

use crate::llm::{
    config::LlmConfig,
    error::LlmResult,
    types::{LlmRequest, LlmResponse},
};
use async_trait::async_trait;

/// Generative backend
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Runs a completion request
    async fn complete(&self, request: &LlmRequest) -> LlmResult<LlmResponse>;

    /// Provider name
    fn name(&self) -> &str;
}

/// Builds the provider selected by the config
pub fn create_provider(config: &LlmConfig) -> LlmResult<Box<dyn LlmProvider>> {
    use crate::llm::config::LlmProvider as ProviderType;

    match config.provider {
        ProviderType::Gemini => Ok(Box::new(gemini::GeminiProvider::new(config.clone())?)),
        ProviderType::OpenAI => Ok(Box::new(openai::OpenAIProvider::new(config.clone())?)),
    }
}
