//! Test Data
//!
//! Shared result sets and configuration snippets.

use pgnl_agent::database::{ExecutionResult, Row};
use serde_json::{json, Value};

/// Builds a row result from JSON objects
pub fn rows(values: Vec<Value>) -> ExecutionResult {
    ExecutionResult::Rows(
        values
            .into_iter()
            .filter_map(|v| v.as_object().cloned())
            .collect::<Vec<Row>>(),
    )
}

/// `[{"count": n}]`
pub fn count_result(n: i64) -> ExecutionResult {
    rows(vec![json!({ "count": n })])
}

pub fn order_rows() -> ExecutionResult {
    rows(vec![
        json!({"id": 1, "customer": "ada", "total": 19.5, "created_at": "2026-10-12T09:30:00+00:00"}),
        json!({"id": 2, "customer": "grace", "total": 7.0, "created_at": "2026-10-13T14:05:00+00:00"}),
    ])
}

/// A configuration file exercising every section
pub const SAMPLE_TOML: &str = r#"
[server]
bind_addr = "127.0.0.1:9100"

[database]
host = "db.test"
port = 5433
name = "shop"
user = "reporter"
max_connections = 4
connect_timeout_secs = 5
idle_timeout_secs = 30

[dialogflow]
project_id = "nl-agent-test"
language_code = "en-GB"

[generative]
provider = "gemini"
default_model = "gemini-1.5-flash"

[speech]
language_code = "en-GB"
encoding = "LINEAR16"
sample_rate_hertz = 8000
speech_endpoint = "https://speech.googleapis.com"
tts_endpoint = "https://texttospeech.googleapis.com"
timeout_secs = 15

[logging]
level = "debug"
format = "json"
"#;
