//! Natural language understanding
//!
//! Turns an utterance into an [`Understanding`]: an intent label with a
//! confidence, plus lexically extracted entities.

pub mod dialogflow;
pub mod entity;
pub mod intent;
pub mod pipeline;
pub mod types;

pub use dialogflow::{DialogflowClassifier, DialogflowConfig};
pub use entity::EntityExtractor;
pub use intent::{IntentClassifier, PatternIntentClassifier};
pub use pipeline::UnderstandingPipeline;
pub use types::{Classification, EntityMap, IntentLabel, TimePeriod, Understanding};
