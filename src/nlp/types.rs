//! Intent labels, entities and the per-request understanding record

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Coarse-grained action category expressed by an utterance
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum IntentLabel {
    /// Retrieve rows
    SelectData,
    /// Count rows
    CountData,
    /// Insert rows
    InsertData,
    /// Update rows
    UpdateData,
    /// Delete rows
    DeleteData,
    /// Nothing recognized
    Unknown,
}

impl IntentLabel {
    /// Every label, in local classification priority order followed by `Unknown`
    pub const ALL: [IntentLabel; 6] = [
        IntentLabel::SelectData,
        IntentLabel::CountData,
        IntentLabel::InsertData,
        IntentLabel::UpdateData,
        IntentLabel::DeleteData,
        IntentLabel::Unknown,
    ];

    /// Returns the wire name of the label
    pub fn as_str(&self) -> &'static str {
        match self {
            IntentLabel::SelectData => "select_data",
            IntentLabel::CountData => "count_data",
            IntentLabel::InsertData => "insert_data",
            IntentLabel::UpdateData => "update_data",
            IntentLabel::DeleteData => "delete_data",
            IntentLabel::Unknown => "unknown",
        }
    }

    /// Checks if this intent would modify data
    pub fn is_write_operation(&self) -> bool {
        matches!(
            self,
            IntentLabel::InsertData | IntentLabel::UpdateData | IntentLabel::DeleteData
        )
    }
}

impl fmt::Display for IntentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IntentLabel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        IntentLabel::ALL
            .into_iter()
            .find(|label| label.as_str() == s)
            .ok_or_else(|| format!("unrecognized intent label: {}", s))
    }
}

/// Relative time window mentioned in an utterance
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TimePeriod {
    LastWeek,
    LastMonth,
    Yesterday,
    Today,
    ThisWeek,
    ThisMonth,
}

impl TimePeriod {
    /// Detection order; the first phrase found in the text wins
    pub const DETECTION_ORDER: [TimePeriod; 6] = [
        TimePeriod::LastWeek,
        TimePeriod::LastMonth,
        TimePeriod::Yesterday,
        TimePeriod::Today,
        TimePeriod::ThisWeek,
        TimePeriod::ThisMonth,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TimePeriod::LastWeek => "last_week",
            TimePeriod::LastMonth => "last_month",
            TimePeriod::Yesterday => "yesterday",
            TimePeriod::Today => "today",
            TimePeriod::ThisWeek => "this_week",
            TimePeriod::ThisMonth => "this_month",
        }
    }
}

impl fmt::Display for TimePeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured values lexically extracted from an utterance.
///
/// A `None` field means the entity was not detected; it is omitted from the
/// serialized map rather than written as a placeholder.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct EntityMap {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_period: Option<TimePeriod>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<u64>,
}

impl EntityMap {
    /// Creates an empty entity map
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the table entity
    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    /// Sets the time period entity
    pub fn with_time_period(mut self, period: TimePeriod) -> Self {
        self.time_period = Some(period);
        self
    }

    /// Sets the number entity
    pub fn with_number(mut self, number: u64) -> Self {
        self.number = Some(number);
        self
    }

    /// True when nothing was detected
    pub fn is_empty(&self) -> bool {
        self.table.is_none() && self.time_period.is_none() && self.number.is_none()
    }

    /// Number of detected entities
    pub fn len(&self) -> usize {
        usize::from(self.table.is_some())
            + usize::from(self.time_period.is_some())
            + usize::from(self.number.is_some())
    }
}

/// Intent classification outcome from a single strategy
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    pub intent: IntentLabel,
    pub confidence: f64,
}

impl Classification {
    pub fn new(intent: IntentLabel, confidence: f64) -> Self {
        Self { intent, confidence }
    }
}

/// Combined result of intent classification and entity extraction for one
/// utterance. Produced once per request and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Understanding {
    intent: IntentLabel,
    confidence: f64,
    entities: EntityMap,
    original_text: String,
}

impl Understanding {
    /// Creates an understanding; confidence is clamped into `[0, 1]`
    pub fn new(
        intent: IntentLabel,
        confidence: f64,
        entities: EntityMap,
        original_text: impl Into<String>,
    ) -> Self {
        let confidence = if confidence.is_finite() {
            confidence.clamp(0.0, 1.0)
        } else {
            0.0
        };

        Self {
            intent,
            confidence,
            entities,
            original_text: original_text.into(),
        }
    }

    /// Builds an understanding from a classifier outcome
    pub fn from_classification(
        classification: Classification,
        entities: EntityMap,
        original_text: impl Into<String>,
    ) -> Self {
        Self::new(
            classification.intent,
            classification.confidence,
            entities,
            original_text,
        )
    }

    pub fn intent(&self) -> IntentLabel {
        self.intent
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    pub fn entities(&self) -> &EntityMap {
        &self.entities
    }

    pub fn original_text(&self) -> &str {
        &self.original_text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intent_label_round_trip_names() {
        for label in IntentLabel::ALL {
            assert_eq!(label.as_str().parse::<IntentLabel>().unwrap(), label);
        }
        assert!("Default Welcome Intent".parse::<IntentLabel>().is_err());
    }

    #[test]
    fn test_intent_is_write_operation() {
        assert!(IntentLabel::DeleteData.is_write_operation());
        assert!(!IntentLabel::SelectData.is_write_operation());
        assert!(!IntentLabel::Unknown.is_write_operation());
    }

    #[test]
    fn test_entity_map_serializes_only_detected_keys() {
        let entities = EntityMap::new()
            .with_table("orders")
            .with_time_period(TimePeriod::LastWeek);
        let json = serde_json::to_value(&entities).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"table": "orders", "time_period": "last_week"})
        );

        let empty = serde_json::to_value(EntityMap::new()).unwrap();
        assert_eq!(empty, serde_json::json!({}));
    }

    #[test]
    fn test_entity_map_len() {
        assert!(EntityMap::new().is_empty());
        assert_eq!(EntityMap::new().with_number(3).with_table("users").len(), 2);
    }

    #[test]
    fn test_understanding_clamps_confidence() {
        let high = Understanding::new(IntentLabel::SelectData, 1.7, EntityMap::new(), "x");
        assert_eq!(high.confidence(), 1.0);

        let nan = Understanding::new(IntentLabel::SelectData, f64::NAN, EntityMap::new(), "x");
        assert_eq!(nan.confidence(), 0.0);
    }

    #[test]
    fn test_understanding_serialization_shape() {
        let understanding = Understanding::new(
            IntentLabel::CountData,
            0.8,
            EntityMap::new().with_number(5),
            "count 5 things",
        );
        let json = serde_json::to_value(&understanding).unwrap();
        assert_eq!(json["intent"], "count_data");
        assert_eq!(json["entities"]["number"], 5);
        assert_eq!(json["original_text"], "count 5 things");
    }
}
