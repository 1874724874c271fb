//! Natural-language summaries of execution results

use serde_json::Value;

use crate::database::ExecutionResult;
use crate::nlp::{IntentLabel, Understanding};

/// Summary for a result the summarizer could not interpret
pub const GENERIC_COMPLETION: &str = "Query completed.";

/// Turns an understanding and its execution result into one sentence.
#[derive(Debug, Clone, Default)]
pub struct ResponseSummarizer;

impl ResponseSummarizer {
    pub fn new() -> Self {
        Self
    }

    /// Never fails; unexpected shapes produce [`GENERIC_COMPLETION`].
    pub fn summarize(&self, understanding: &Understanding, result: &ExecutionResult) -> String {
        match understanding.intent() {
            IntentLabel::CountData => Self::summarize_count(result),
            IntentLabel::SelectData => Self::summarize_rows(result),
            IntentLabel::InsertData
            | IntentLabel::UpdateData
            | IntentLabel::DeleteData
            | IntentLabel::Unknown => "Query executed successfully.".to_string(),
        }
    }

    fn summarize_count(result: &ExecutionResult) -> String {
        let count = result
            .rows()
            .and_then(|rows| rows.first())
            .and_then(|row| row.get("count"));

        match count {
            None => "I couldn't count the records.".to_string(),
            Some(value) => match scalar_text(value) {
                Some(n) => format!("I found {} records.", n),
                None => GENERIC_COMPLETION.to_string(),
            },
        }
    }

    fn summarize_rows(result: &ExecutionResult) -> String {
        match result {
            ExecutionResult::Rows(rows) => match rows.len() {
                0 => "No records found.".to_string(),
                1 => "I found 1 record.".to_string(),
                n => format!("I found {} records.", n),
            },
            ExecutionResult::Affected { .. } => "I couldn't retrieve the data.".to_string(),
        }
    }
}

/// Renders a scalar JSON value as the count shown to the user
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s.clone()),
        Value::Null | Value::Bool(_) | Value::Array(_) | Value::Object(_) => None,
    }
}
