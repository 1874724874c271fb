//! Intent classification strategies

use crate::error::Result;
use async_trait::async_trait;

use super::types::{Classification, IntentLabel};

/// Confidence reported by the pattern classifier on a trigger match
pub const PATTERN_MATCH_CONFIDENCE: f64 = 0.8;

/// Confidence reported when no trigger phrase matches
pub const UNKNOWN_CONFIDENCE: f64 = 0.5;

/// Intent classifier strategy
///
/// A strategy either returns a classification or signals that it cannot
/// serve this request; the pipeline then moves on to the next strategy.
#[async_trait]
pub trait IntentClassifier: Send + Sync {
    /// Classifies the intent of raw text
    async fn classify(&self, text: &str) -> Result<Classification>;

    /// Strategy name used in logs
    fn name(&self) -> &str;
}

/// Trigger phrases per intent, in priority order
const INTENT_TRIGGERS: &[(IntentLabel, &[&str])] = &[
    (
        IntentLabel::SelectData,
        &[
            "show me", "display", "get", "find", "list", "what", "select", "retrieve", "fetch",
            "see", "view",
        ],
    ),
    (
        IntentLabel::CountData,
        &["count", "how many", "total number", "number of"],
    ),
    (
        IntentLabel::InsertData,
        &["add", "insert", "create", "new"],
    ),
    (
        IntentLabel::UpdateData,
        &["update", "modify", "change", "edit", "set"],
    ),
    (
        IntentLabel::DeleteData,
        &["delete", "remove", "drop", "clear"],
    ),
];

/// Local trigger-phrase classifier; always available
#[derive(Debug, Clone, Default)]
pub struct PatternIntentClassifier;

impl PatternIntentClassifier {
    /// Creates a new pattern classifier
    pub fn new() -> Self {
        Self
    }

    /// Classifies text synchronously.
    ///
    /// Intents are tested in priority order and the first one with any
    /// trigger phrase present wins, so `"count ... show me"` is `select_data`.
    pub fn classify_text(&self, text: &str) -> Classification {
        let text_lower = text.to_lowercase();

        INTENT_TRIGGERS
            .iter()
            .find(|(_, triggers)| triggers.iter().any(|t| text_lower.contains(t)))
            .map(|(intent, _)| Classification::new(*intent, PATTERN_MATCH_CONFIDENCE))
            .unwrap_or_else(|| Classification::new(IntentLabel::Unknown, UNKNOWN_CONFIDENCE))
    }

    /// Trigger phrases associated with an intent
    pub fn triggers(intent: IntentLabel) -> &'static [&'static str] {
        INTENT_TRIGGERS
            .iter()
            .find(|(label, _)| *label == intent)
            .map(|(_, triggers)| *triggers)
            .unwrap_or(&[])
    }
}

#[async_trait]
impl IntentClassifier for PatternIntentClassifier {
    async fn classify(&self, text: &str) -> Result<Classification> {
        Ok(self.classify_text(text))
    }

    fn name(&self) -> &str {
        "pattern"
    }
}
