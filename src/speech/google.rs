//! Google Cloud Speech-to-Text and Text-to-Speech REST clients

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{Error, Result};

use super::Transcriber;

const SPEECH_ENDPOINT: &str = "https://speech.googleapis.com";
const TTS_ENDPOINT: &str = "https://texttospeech.googleapis.com";

/// Speech service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechConfig {
    pub language_code: String,
    /// Recognition encoding, e.g. `LINEAR16`
    pub encoding: String,
    pub sample_rate_hertz: u32,
    /// OAuth access token
    #[serde(default, skip_serializing)]
    pub access_token: Option<SecretString>,
    pub speech_endpoint: String,
    pub tts_endpoint: String,
    pub timeout_secs: u64,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            language_code: "en-US".to_string(),
            encoding: "LINEAR16".to_string(),
            sample_rate_hertz: 16000,
            access_token: None,
            speech_endpoint: SPEECH_ENDPOINT.to_string(),
            tts_endpoint: TTS_ENDPOINT.to_string(),
            timeout_secs: 30,
        }
    }
}

impl SpeechConfig {
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(SecretString::new(token.into().into_boxed_str()));
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Speech client for recognition and synthesis
#[derive(Debug, Clone)]
pub struct GoogleSpeechClient {
    config: SpeechConfig,
    client: Client,
}

impl GoogleSpeechClient {
    pub fn new(config: SpeechConfig) -> Result<Self> {
        if config.sample_rate_hertz == 0 {
            return Err(Error::Config(
                "speech sample rate must be positive".to_string(),
            ));
        }

        let client = Client::builder().timeout(config.timeout()).build()?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &SpeechConfig {
        &self.config
    }

    fn token(&self) -> Result<&str> {
        self.config
            .access_token
            .as_ref()
            .map(|t| t.expose_secret())
            .ok_or_else(|| Error::ServiceUnavailable("speech access token not configured".to_string()))
    }

    pub(crate) fn recognize_request(&self, audio: &[u8]) -> RecognizeRequest {
        RecognizeRequest {
            config: RecognitionConfig {
                encoding: self.config.encoding.clone(),
                sample_rate_hertz: self.config.sample_rate_hertz,
                language_code: self.config.language_code.clone(),
                enable_automatic_punctuation: true,
                enable_word_confidence: true,
            },
            audio: RecognitionAudio {
                content: STANDARD.encode(audio),
            },
        }
    }

    /// Joins the top alternative of every result
    pub(crate) fn transcript(response: RecognizeResponse) -> String {
        response
            .results
            .into_iter()
            .filter_map(|r| r.alternatives.into_iter().next())
            .map(|a| a.transcript.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Speech-to-text on raw audio bytes
    pub async fn recognize(&self, audio: &[u8]) -> Result<String> {
        let token = self.token()?;

        let response = self
            .client
            .post(format!(
                "{}/v1/speech:recognize",
                self.config.speech_endpoint.trim_end_matches('/')
            ))
            .bearer_auth(token)
            .json(&self.recognize_request(audio))
            .send()
            .await
            .map_err(|e| Error::Transcription(format!("recognize request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(Error::Transcription(format!(
                "Speech API error ({}): {}",
                status, error_text
            )));
        }

        let body: RecognizeResponse = response
            .json()
            .await
            .map_err(|e| Error::Transcription(format!("invalid recognize response: {}", e)))?;

        let transcript = Self::transcript(body);
        info!(transcript = %transcript, "speech recognized");
        Ok(transcript)
    }

    /// Text-to-speech; returns MP3 bytes
    pub async fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
        let token = self.token()?;

        let request = SynthesizeRequest {
            input: SynthesisInput {
                text: text.to_string(),
            },
            voice: VoiceSelection {
                language_code: self.config.language_code.clone(),
                ssml_gender: "NEUTRAL".to_string(),
            },
            audio_config: AudioConfig {
                audio_encoding: "MP3".to_string(),
            },
        };

        let response = self
            .client
            .post(format!(
                "{}/v1/text:synthesize",
                self.config.tts_endpoint.trim_end_matches('/')
            ))
            .bearer_auth(token)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::ServiceUnavailable(format!("synthesize request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(Error::ServiceUnavailable(format!(
                "Text-to-Speech API error ({}): {}",
                status, error_text
            )));
        }

        let body: SynthesizeResponse = response.json().await?;
        let audio = STANDARD
            .decode(body.audio_content.as_bytes())
            .map_err(|e| Error::ServiceUnavailable(format!("invalid audio content: {}", e)))?;

        debug!(bytes = audio.len(), "speech synthesized");
        Ok(audio)
    }
}

#[async_trait]
impl Transcriber for GoogleSpeechClient {
    async fn transcribe(&self, audio: &[u8], content_type: &str) -> Result<String> {
        if !content_type.starts_with("audio/") {
            return Err(Error::InvalidInput("File must be an audio file".to_string()));
        }

        let transcript = self.recognize(audio).await?;
        if transcript.is_empty() {
            return Err(Error::Transcription(
                "No speech detected in audio file".to_string(),
            ));
        }

        Ok(transcript)
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct RecognizeRequest {
    config: RecognitionConfig,
    audio: RecognitionAudio,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RecognitionConfig {
    encoding: String,
    sample_rate_hertz: u32,
    language_code: String,
    enable_automatic_punctuation: bool,
    enable_word_confidence: bool,
}

#[derive(Debug, Serialize)]
struct RecognitionAudio {
    content: String,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RecognizeResponse {
    #[serde(default)]
    results: Vec<RecognitionResult>,
}

#[derive(Debug, Deserialize)]
struct RecognitionResult {
    #[serde(default)]
    alternatives: Vec<RecognitionAlternative>,
}

#[derive(Debug, Deserialize)]
struct RecognitionAlternative {
    #[serde(default)]
    transcript: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeRequest {
    input: SynthesisInput,
    voice: VoiceSelection,
    audio_config: AudioConfig,
}

#[derive(Debug, Serialize)]
struct SynthesisInput {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VoiceSelection {
    language_code: String,
    ssml_gender: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AudioConfig {
    audio_encoding: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeResponse {
    #[serde(default)]
    audio_content: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn client() -> GoogleSpeechClient {
        GoogleSpeechClient::new(SpeechConfig::default().with_access_token("token")).unwrap()
    }

    #[test]
    fn test_recognize_request_shape() {
        let body = serde_json::to_value(client().recognize_request(b"\x01\x02\x03")).unwrap();

        assert_eq!(body["config"]["encoding"], "LINEAR16");
        assert_eq!(body["config"]["sampleRateHertz"], 16000);
        assert_eq!(body["config"]["languageCode"], "en-US");
        assert_eq!(body["config"]["enableAutomaticPunctuation"], true);
        assert_eq!(body["audio"]["content"], "AQID");
    }

    #[test]
    fn test_transcript_joins_top_alternatives() {
        let response: RecognizeResponse = serde_json::from_value(json!({
            "results": [
                {"alternatives": [{"transcript": "show me all orders ", "confidence": 0.9},
                                  {"transcript": "show me all borders"}]},
                {"alternatives": [{"transcript": "from last week"}]},
                {"alternatives": []}
            ]
        }))
        .unwrap();

        assert_eq!(
            GoogleSpeechClient::transcript(response),
            "show me all orders from last week"
        );
    }

    #[test]
    fn test_empty_response_has_empty_transcript() {
        assert_eq!(GoogleSpeechClient::transcript(RecognizeResponse::default()), "");
    }

    #[test]
    fn test_zero_sample_rate_rejected() {
        let config = SpeechConfig {
            sample_rate_hertz: 0,
            ..Default::default()
        };
        assert!(matches!(GoogleSpeechClient::new(config), Err(Error::Config(_))));
    }

    #[tokio::test]
    async fn test_transcribe_rejects_non_audio() {
        let err = client()
            .transcribe(b"hello", "text/plain")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
        assert_eq!(err.status_code(), 400);
    }

    #[tokio::test]
    async fn test_recognize_without_token_is_unavailable() {
        let client = GoogleSpeechClient::new(SpeechConfig::default()).unwrap();
        let err = client.recognize(b"\x00").await.unwrap_err();
        assert!(matches!(err, Error::ServiceUnavailable(_)));

        let err = client.synthesize("I found 2 records.").await.unwrap_err();
        assert!(matches!(err, Error::ServiceUnavailable(_)));
    }
}
