//! Query agent: understanding, synthesis, execution and summary for one request

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::database::{ExecutionResult, PostgresExecutor, QueryExecutor};
use crate::error::{Error, Result};
use crate::llm::LlmClient;
use crate::nlp::{DialogflowClassifier, Understanding, UnderstandingPipeline};
use crate::speech::{GoogleSpeechClient, Transcriber};
use crate::sql::{GenerativeSynthesizer, QuerySynthesizer};
use crate::summarizer::ResponseSummarizer;

/// Externally visible answer to a query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    pub query: String,
    pub sql_generated: String,
    pub result: ExecutionResult,
    pub confidence: f64,
    pub message: String,
}

/// Understanding and SQL for an utterance, before execution
#[derive(Debug, Clone, Serialize)]
pub struct QueryPlan {
    pub understanding: Understanding,
    pub sql: String,
}

pub struct QueryAgent {
    pipeline: UnderstandingPipeline,
    synthesizer: QuerySynthesizer,
    summarizer: ResponseSummarizer,
    executor: Arc<dyn QueryExecutor>,
    transcriber: Option<Arc<dyn Transcriber>>,
}

impl QueryAgent {
    pub fn new(
        pipeline: UnderstandingPipeline,
        synthesizer: QuerySynthesizer,
        executor: Arc<dyn QueryExecutor>,
    ) -> Self {
        Self {
            pipeline,
            synthesizer,
            summarizer: ResponseSummarizer::new(),
            executor,
            transcriber: None,
        }
    }

    pub fn with_transcriber(mut self, transcriber: Arc<dyn Transcriber>) -> Self {
        self.transcriber = Some(transcriber);
        self
    }

    /// Builds every strategy once from configuration.
    ///
    /// The database pool is created lazily, so a down database does not
    /// prevent startup.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let mut pipeline = UnderstandingPipeline::new();
        if let Some(dialogflow) = &config.dialogflow {
            pipeline = pipeline.with_classifier(Arc::new(DialogflowClassifier::new(
                dialogflow.clone(),
            )?));
        }

        let mut synthesizer = QuerySynthesizer::new();
        if let Some(generative) = &config.generative {
            let client = LlmClient::new(generative.clone())?;
            synthesizer =
                synthesizer.with_strategy(Arc::new(GenerativeSynthesizer::new(Arc::new(client))));
        }

        let executor = PostgresExecutor::connect_lazy(&config.database)?;
        let speech = GoogleSpeechClient::new(config.speech.clone())?;

        info!(
            classifiers = ?pipeline.strategy_names(),
            synthesizers = ?synthesizer.strategy_names(),
            "query agent ready"
        );

        Ok(Self::new(pipeline, synthesizer, Arc::new(executor)).with_transcriber(Arc::new(speech)))
    }

    /// Understanding and SQL without touching the database
    pub async fn plan(&self, text: &str) -> QueryPlan {
        let understanding = self.pipeline.process(text).await;
        let sql = self.synthesizer.synthesize(&understanding).await;
        QueryPlan { understanding, sql }
    }

    /// Full text flow; only execution errors propagate
    pub async fn handle_text(&self, text: &str) -> Result<QueryResponse> {
        let QueryPlan { understanding, sql } = self.plan(text).await;
        info!(
            intent = %understanding.intent(),
            confidence = understanding.confidence(),
            sql = %sql,
            "executing generated query"
        );
        if understanding.intent().is_write_operation() {
            info!(intent = %understanding.intent(), "mutating intent served as a bounded read");
        }

        let result = self.executor.execute(&sql).await.map_err(|e| {
            warn!(error = %e, sql = %sql, "query execution failed");
            Error::Database(e)
        })?;
        debug!(rows = result.row_count(), "query executed");

        let message = self.summarizer.summarize(&understanding, &result);

        Ok(QueryResponse {
            query: text.to_string(),
            sql_generated: sql,
            result,
            confidence: understanding.confidence(),
            message,
        })
    }

    /// Transcribes audio, then runs the text flow on the transcript
    pub async fn handle_voice(&self, audio: &[u8], content_type: &str) -> Result<QueryResponse> {
        let transcriber = self.transcriber.as_ref().ok_or_else(|| {
            Error::ServiceUnavailable("speech recognition is not configured".to_string())
        })?;

        let transcript = transcriber.transcribe(audio, content_type).await?;
        info!(transcript = %transcript, "voice query transcribed");

        self.handle_text(&transcript).await
    }

    pub async fn is_database_connected(&self) -> bool {
        self.executor.is_connected().await
    }

    /// Releases the database pool; called once serving has stopped
    pub async fn shutdown(&self) {
        self.executor.close().await;
        info!("query agent shut down");
    }
}
