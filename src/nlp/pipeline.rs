//! Understanding pipeline: entity extraction plus an ordered classifier chain

use std::sync::Arc;
use tracing::{debug, error, warn};

use super::entity::EntityExtractor;
use super::intent::{IntentClassifier, PatternIntentClassifier};
use super::types::Understanding;

/// Composes the entity extractor with intent classifiers.
///
/// Remote strategies are tried in order, once each; the first success wins.
/// The local pattern classifier is the terminal fallback and cannot fail.
pub struct UnderstandingPipeline {
    extractor: EntityExtractor,
    remote: Vec<Arc<dyn IntentClassifier>>,
    local: PatternIntentClassifier,
}

impl UnderstandingPipeline {
    /// Pipeline with only local classification
    pub fn new() -> Self {
        Self {
            extractor: EntityExtractor::new(),
            remote: Vec::new(),
            local: PatternIntentClassifier::new(),
        }
    }

    /// Adds a remote classifier ahead of the local fallback
    pub fn with_classifier(mut self, classifier: Arc<dyn IntentClassifier>) -> Self {
        self.remote.push(classifier);
        self
    }

    /// Names of the strategies in the order they are tried
    pub fn strategy_names(&self) -> Vec<String> {
        self.remote
            .iter()
            .map(|c| c.name().to_string())
            .chain(std::iter::once(
                IntentClassifier::name(&self.local).to_string(),
            ))
            .collect()
    }

    /// Produces an understanding for one utterance; never fails
    pub async fn process(&self, text: &str) -> Understanding {
        let entities = self.extractor.extract(text);

        for classifier in &self.remote {
            match classifier.classify(text).await {
                Ok(classification) => {
                    debug!(
                        strategy = classifier.name(),
                        intent = %classification.intent,
                        "intent classified"
                    );
                    return Understanding::from_classification(classification, entities, text);
                }
                Err(e) if e.is_recoverable() => {
                    warn!(
                        strategy = classifier.name(),
                        error = %e,
                        "intent classifier failed, falling back"
                    );
                }
                Err(e) => {
                    error!(
                        strategy = classifier.name(),
                        error = %e,
                        "unexpected intent classifier error, falling back"
                    );
                }
            }
        }

        let classification = self.local.classify_text(text);
        debug!(strategy = "pattern", intent = %classification.intent, "intent classified");
        Understanding::from_classification(classification, entities, text)
    }
}

impl Default for UnderstandingPipeline {
    fn default() -> Self {
        Self::new()
    }
}
