//! Dialogflow ES intent detection over the REST API
//!
//! The agent's intents must be named after the closed label set
//! (`select_data`, `count_data`, ...). Any other display name, a missing
//! confidence or a transport failure is reported as `ServiceUnavailable` so
//! the pipeline falls back to local classification.

use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

use super::intent::IntentClassifier;
use super::types::{Classification, IntentLabel};

const DEFAULT_ENDPOINT: &str = "https://dialogflow.googleapis.com";

/// Dialogflow connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DialogflowConfig {
    /// Google Cloud project that owns the agent
    pub project_id: String,
    /// Fixed session id; a fresh id is used per request when unset
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default = "default_language_code")]
    pub language_code: String,
    /// OAuth access token
    #[serde(skip_serializing)]
    pub access_token: Option<SecretString>,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_language_code() -> String {
    "en-US".to_string()
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_timeout() -> u64 {
    10
}

impl DialogflowConfig {
    /// Creates a config for a project with default settings
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            session_id: None,
            language_code: default_language_code(),
            access_token: None,
            endpoint: default_endpoint(),
            timeout_secs: default_timeout(),
        }
    }

    /// Sets the access token
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(SecretString::new(token.into().into_boxed_str()));
        self
    }

    /// Overrides the API endpoint
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Remote intent classifier backed by Dialogflow
#[derive(Debug, Clone)]
pub struct DialogflowClassifier {
    config: DialogflowConfig,
    client: Client,
}

impl DialogflowClassifier {
    /// Creates a classifier; fails if the project id is empty
    pub fn new(config: DialogflowConfig) -> Result<Self> {
        if config.project_id.trim().is_empty() {
            return Err(Error::Config(
                "Dialogflow project id must not be empty".to_string(),
            ));
        }

        let client = Client::builder().timeout(config.timeout()).build()?;

        Ok(Self { config, client })
    }

    fn session_url(&self) -> String {
        let session = self
            .config
            .session_id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        format!(
            "{}/v2/projects/{}/agent/sessions/{}:detectIntent",
            self.config.endpoint.trim_end_matches('/'),
            self.config.project_id,
            session
        )
    }

    /// Turns a detectIntent response into a classification, rejecting
    /// anything outside the closed label set or confidence range
    pub fn interpret(response: DetectIntentResponse) -> Result<Classification> {
        let result = response.query_result.ok_or_else(|| {
            Error::ServiceUnavailable("detectIntent response has no queryResult".to_string())
        })?;

        let display_name = result
            .intent
            .map(|intent| intent.display_name)
            .ok_or_else(|| {
                Error::ServiceUnavailable("detectIntent response has no intent".to_string())
            })?;

        let intent = display_name
            .parse::<IntentLabel>()
            .map_err(Error::ServiceUnavailable)?;

        // Proto3 JSON omits zero values, so an absent confidence is 0.0
        let confidence = result.intent_detection_confidence.unwrap_or(0.0);

        if !confidence.is_finite() || !(0.0..=1.0).contains(&confidence) {
            return Err(Error::ServiceUnavailable(format!(
                "confidence out of range: {}",
                confidence
            )));
        }

        Ok(Classification::new(intent, confidence))
    }
}

#[async_trait]
impl IntentClassifier for DialogflowClassifier {
    async fn classify(&self, text: &str) -> Result<Classification> {
        let token = self.config.access_token.as_ref().ok_or_else(|| {
            Error::ServiceUnavailable("Dialogflow access token not configured".to_string())
        })?;

        let request = DetectIntentRequest {
            query_input: QueryInput {
                text: TextInput {
                    text: text.to_string(),
                    language_code: self.config.language_code.clone(),
                },
            },
        };

        let response = self
            .client
            .post(self.session_url())
            .bearer_auth(token.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::ServiceUnavailable(format!("Dialogflow request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(Error::ServiceUnavailable(format!(
                "Dialogflow API error ({}): {}",
                status, error_text
            )));
        }

        let body: DetectIntentResponse = response
            .json()
            .await
            .map_err(|e| Error::ServiceUnavailable(format!("garbled Dialogflow response: {}", e)))?;

        let classification = Self::interpret(body)?;
        debug!(
            intent = %classification.intent,
            confidence = classification.confidence,
            "Dialogflow classified utterance"
        );

        Ok(classification)
    }

    fn name(&self) -> &str {
        "dialogflow"
    }
}

/// detectIntent request body
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DetectIntentRequest {
    query_input: QueryInput,
}

#[derive(Debug, Serialize)]
struct QueryInput {
    text: TextInput,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TextInput {
    text: String,
    language_code: String,
}

/// detectIntent response body (fields this crate reads)
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectIntentResponse {
    #[serde(default)]
    pub response_id: Option<String>,
    #[serde(default)]
    pub query_result: Option<QueryResult>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult {
    #[serde(default)]
    pub query_text: Option<String>,
    #[serde(default)]
    pub intent: Option<DetectedIntent>,
    #[serde(default)]
    pub intent_detection_confidence: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectedIntent {
    #[serde(default)]
    pub name: Option<String>,
    pub display_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(value: serde_json::Value) -> DetectIntentResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_interpret_valid_response() {
        let body = response(json!({
            "responseId": "abc",
            "queryResult": {
                "queryText": "how many users",
                "intent": {"name": "projects/p/agent/intents/1", "displayName": "count_data"},
                "intentDetectionConfidence": 0.93
            }
        }));

        let classification = DialogflowClassifier::interpret(body).unwrap();
        assert_eq!(classification.intent, IntentLabel::CountData);
        assert_eq!(classification.confidence, 0.93);
    }

    #[test]
    fn test_interpret_rejects_foreign_intent() {
        let body = response(json!({
            "queryResult": {
                "intent": {"displayName": "Default Welcome Intent"},
                "intentDetectionConfidence": 1.0
            }
        }));

        let err = DialogflowClassifier::interpret(body).unwrap_err();
        assert!(matches!(err, Error::ServiceUnavailable(_)));
    }

    #[test]
    fn test_interpret_missing_confidence_is_zero() {
        let body = response(json!({
            "queryResult": {"intent": {"displayName": "select_data"}}
        }));
        let classification = DialogflowClassifier::interpret(body).unwrap();
        assert_eq!(classification.intent, IntentLabel::SelectData);
        assert_eq!(classification.confidence, 0.0);
    }

    #[test]
    fn test_interpret_rejects_missing_result() {
        assert!(DialogflowClassifier::interpret(response(json!({}))).is_err());
    }

    #[test]
    fn test_empty_project_is_config_error() {
        let err = DialogflowClassifier::new(DialogflowConfig::new("  ")).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_session_url() {
        let mut config = DialogflowConfig::new("my-project").with_endpoint("http://localhost:9000/");
        config.session_id = Some("fixed".to_string());
        let classifier = DialogflowClassifier::new(config).unwrap();
        assert_eq!(
            classifier.session_url(),
            "http://localhost:9000/v2/projects/my-project/agent/sessions/fixed:detectIntent"
        );
    }

    #[tokio::test]
    async fn test_missing_token_is_unavailable() {
        let classifier = DialogflowClassifier::new(DialogflowConfig::new("my-project")).unwrap();
        let err = classifier.classify("show me users").await.unwrap_err();
        assert!(matches!(err, Error::ServiceUnavailable(_)));
    }
}
