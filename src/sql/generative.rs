//! LLM-backed SQL generation

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::llm::LlmClient;
use crate::nlp::Understanding;

use super::{is_accepted_statement, QueryStrategy};

const SYSTEM_PROMPT: &str =
    "You translate questions about a PostgreSQL database into a single SQL statement.";

/// Generates SQL with a language model and rejects anything that does not
/// start with an accepted statement keyword.
pub struct GenerativeSynthesizer {
    client: Arc<LlmClient>,
}

impl GenerativeSynthesizer {
    pub fn new(client: Arc<LlmClient>) -> Self {
        Self { client }
    }

    /// Prompt sent to the model for one understanding
    pub fn build_prompt(understanding: &Understanding) -> String {
        let entities = serde_json::to_string(understanding.entities())
            .unwrap_or_else(|_| "{}".to_string());

        format!(
            "Convert this natural language query to SQL:\n\n\
             Query: {}\n\
             Intent: {}\n\
             Entities: {}\n\n\
             Generate a valid PostgreSQL query. Only return the SQL query, nothing else.",
            understanding.original_text(),
            understanding.intent(),
            entities
        )
    }

    /// Cleans model output and checks the leading keyword
    pub fn sanitize(output: &str) -> Result<String> {
        let sql = strip_code_fence(output.trim()).trim();

        if sql.is_empty() {
            return Err(Error::ValidationFailure(
                "generated SQL is empty".to_string(),
            ));
        }
        if !is_accepted_statement(sql) {
            return Err(Error::ValidationFailure(format!(
                "generated text is not an accepted statement: {}",
                sql.split_whitespace().next().unwrap_or_default()
            )));
        }

        Ok(sql.to_string())
    }
}

/// Removes a surrounding Markdown code fence, with or without a language tag
fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // drop the info string (e.g. "sql") on the opening line
    let body = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    };
    body.strip_suffix("```").unwrap_or(body)
}

#[async_trait]
impl QueryStrategy for GenerativeSynthesizer {
    async fn synthesize(&self, understanding: &Understanding) -> Result<String> {
        let prompt = Self::build_prompt(understanding);
        let output = self
            .client
            .complete_with_system(SYSTEM_PROMPT, prompt)
            .await
            .map_err(|e| Error::ServiceUnavailable(format!("SQL generation failed: {}", e)))?;

        Self::sanitize(&output)
    }

    fn name(&self) -> &str {
        "generative"
    }
}
