//! Voice input and output

pub mod google;

use async_trait::async_trait;

use crate::error::Result;

pub use google::{GoogleSpeechClient, SpeechConfig};

/// Converts uploaded audio to text
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// `content_type` is the upload's MIME type; only `audio/*` is accepted.
    async fn transcribe(&self, audio: &[u8], content_type: &str) -> Result<String>;
}
