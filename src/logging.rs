//! Structured logging setup and per-request context

use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{field, info, Span};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};
use uuid::Uuid;

/// Log configuration options
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Log level (error, warn, info, debug, trace); `RUST_LOG` wins when set
    pub level: String,

    /// Log format (json, human)
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Human,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: if cfg!(debug_assertions) {
                LogFormat::Human
            } else {
                LogFormat::Json
            },
        }
    }
}

impl LogConfig {
    fn filter(&self) -> Result<EnvFilter, tracing_subscriber::filter::ParseError> {
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&self.level))
    }
}

/// Installs the global subscriber.
///
/// Fails if the level does not parse or a subscriber is already installed.
pub fn init(config: &LogConfig) -> anyhow::Result<()> {
    let registry = tracing_subscriber::registry().with(config.filter()?);

    match config.format {
        LogFormat::Json => {
            let fmt_layer = fmt::layer()
                .json()
                .with_span_events(FmtSpan::CLOSE)
                .with_current_span(true);

            registry.with(fmt_layer).try_init()?;
        }
        LogFormat::Human => {
            let fmt_layer = fmt::layer()
                .with_span_events(FmtSpan::CLOSE)
                .with_target(true);

            registry.with(fmt_layer).try_init()?;
        }
    }

    info!(level = %config.level, format = ?config.format, "Logging initialized");
    Ok(())
}

/// Correlation data for one natural-language query
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: String,
    pub user_id: Option<String>,
    pub channel: &'static str,
    start_time: Instant,
}

impl RequestContext {
    /// Context with a fresh request id
    pub fn new(channel: &'static str) -> Self {
        Self {
            request_id: Uuid::new_v4().to_string(),
            user_id: None,
            channel,
            start_time: Instant::now(),
        }
    }

    pub fn with_user(mut self, user_id: Option<String>) -> Self {
        self.user_id = user_id;
        self
    }

    /// `nl_query` span carrying the request id
    pub fn span(&self) -> Span {
        let span = tracing::info_span!(
            "nl_query",
            request_id = %self.request_id,
            channel = self.channel,
            user_id = field::Empty,
        );

        if let Some(ref user_id) = self.user_id {
            span.record("user_id", user_id.as_str());
        }

        span
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.start_time.elapsed().as_millis() as u64
    }
}
