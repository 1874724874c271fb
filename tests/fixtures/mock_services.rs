//! Mock Services
//!
//! Hand-written stand-ins for the agent's collaborators.

use async_trait::async_trait;
use pgnl_agent::database::{DatabaseError, ExecutionResult, QueryExecutor};
use pgnl_agent::error::{Error, Result};
use pgnl_agent::nlp::{Classification, IntentClassifier, Understanding};
use pgnl_agent::speech::Transcriber;
use pgnl_agent::sql::QueryStrategy;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Executor returning a canned result and recording every statement
pub struct MockExecutor {
    outcome: std::result::Result<ExecutionResult, String>,
    connected: bool,
    executed: Arc<Mutex<Vec<String>>>,
    closes: AtomicUsize,
}

impl MockExecutor {
    pub fn returning(result: ExecutionResult) -> Self {
        Self {
            outcome: Ok(result),
            connected: true,
            executed: Arc::new(Mutex::new(Vec::new())),
            closes: AtomicUsize::new(0),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            outcome: Err(message.to_string()),
            connected: false,
            executed: Arc::new(Mutex::new(Vec::new())),
            closes: AtomicUsize::new(0),
        }
    }

    pub async fn executed(&self) -> Vec<String> {
        self.executed.lock().await.clone()
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl QueryExecutor for MockExecutor {
    async fn execute(&self, sql: &str) -> std::result::Result<ExecutionResult, DatabaseError> {
        self.executed.lock().await.push(sql.to_string());
        self.outcome
            .clone()
            .map_err(DatabaseError::QueryFailed)
    }

    async fn is_connected(&self) -> bool {
        self.connected && self.closes() == 0
    }

    async fn close(&self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}

/// Transcriber with a fixed transcript
pub struct MockTranscriber {
    transcript: String,
    content_types: Arc<Mutex<Vec<String>>>,
}

impl MockTranscriber {
    pub fn new(transcript: &str) -> Self {
        Self {
            transcript: transcript.to_string(),
            content_types: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub async fn content_types(&self) -> Vec<String> {
        self.content_types.lock().await.clone()
    }
}

#[async_trait]
impl Transcriber for MockTranscriber {
    async fn transcribe(&self, _audio: &[u8], content_type: &str) -> Result<String> {
        self.content_types.lock().await.push(content_type.to_string());
        if !content_type.starts_with("audio/") {
            return Err(Error::InvalidInput("File must be an audio file".to_string()));
        }
        Ok(self.transcript.clone())
    }
}

/// Remote classifier stand-in; `None` simulates an outage
pub struct MockClassifier {
    outcome: Option<Classification>,
    calls: AtomicUsize,
}

impl MockClassifier {
    pub fn answering(classification: Classification) -> Self {
        Self {
            outcome: Some(classification),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            outcome: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IntentClassifier for MockClassifier {
    async fn classify(&self, _text: &str) -> Result<Classification> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.outcome
            .ok_or_else(|| Error::ServiceUnavailable("mock classifier offline".to_string()))
    }

    fn name(&self) -> &str {
        "mock-remote"
    }
}

/// Generative strategy stand-in returning raw text or an error
pub struct MockStrategy {
    output: Option<String>,
    calls: AtomicUsize,
}

impl MockStrategy {
    pub fn producing(sql: &str) -> Self {
        Self {
            output: Some(sql.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            output: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl QueryStrategy for MockStrategy {
    async fn synthesize(&self, _understanding: &Understanding) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.output
            .clone()
            .ok_or_else(|| Error::ServiceUnavailable("mock generator offline".to_string()))
    }

    fn name(&self) -> &str {
        "mock-generative"
    }
}
