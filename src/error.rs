//! Error types for the natural-language query agent.

use thiserror::Error;

use crate::database::DatabaseError;
use crate::llm::LlmError;

/// Result type alias for agent operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for agent operations
#[derive(Debug, Error)]
pub enum Error {
    /// A remote classifier or generator is not configured, unreachable,
    /// or returned an unusable response
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Generated text does not look like the expected statement kind
    #[error("Validation failure: {0}")]
    ValidationFailure(String),

    /// Query execution failed in the database layer
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Speech transcription or synthesis failed
    #[error("Transcription error: {0}")]
    Transcription(String),

    /// Invalid input from the caller
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generative backend error
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    /// Network error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether the pipeline recovers from this error by falling back to a
    /// deterministic strategy
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::ServiceUnavailable(_)
                | Error::ValidationFailure(_)
                | Error::Llm(_)
                | Error::Network(_)
                | Error::Json(_)
        )
    }

    /// HTTP status code reported by the serving layer
    pub fn status_code(&self) -> u16 {
        match self {
            Error::InvalidInput(_) | Error::Transcription(_) => 400,
            Error::ServiceUnavailable(_) => 503,
            _ => 500,
        }
    }
}
