//! Generative AI backends
//!
//! Gemini and OpenAI-compatible providers behind a single client, used for
//! free-form SQL generation.

pub mod client;
pub mod config;
pub mod error;
pub mod providers;
pub mod types;

pub use client::LlmClient;
pub use config::{LlmConfig, LlmProvider};
pub use error::{LlmError, LlmResult};
pub use types::{LlmRequest, LlmResponse, Message, Role};
