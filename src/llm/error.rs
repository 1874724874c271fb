//! Error types for generative backends

use thiserror::Error;

/// Generative backend errors
#[derive(Error, Debug)]
pub enum LlmError {
    /// API call failed
    #[error("API error: {0}")]
    ApiError(String),

    /// Authentication failed
    #[error("Authentication error: {0}")]
    AuthError(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded: {0}")]
    RateLimitError(String),

    /// Invalid request
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Network error
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Request timed out
    #[error("Request timeout after {0}s")]
    Timeout(u64),

    /// The backend answered without any text
    #[error("Empty response from {0}")]
    EmptyResponse(String),

    /// JSON parse error
    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl LlmError {
    /// Maps an HTTP status and body to the matching error kind
    pub fn from_status(status: reqwest::StatusCode, body: String) -> Self {
        match status.as_u16() {
            401 | 403 => LlmError::AuthError(body),
            429 => LlmError::RateLimitError(body),
            400 => LlmError::InvalidRequest(body),
            _ => LlmError::ApiError(format!("({}) {}", status, body)),
        }
    }
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LlmError::Timeout(0)
        } else {
            LlmError::NetworkError(err.to_string())
        }
    }
}

/// Result type for generative backends
pub type LlmResult<T> = Result<T, LlmError>;
