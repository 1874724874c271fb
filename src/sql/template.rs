//! Deterministic SQL templates
//!
//! Queries are assembled from typed clauses so the set of shapes this module
//! can produce stays closed: a star or count projection over one table, an
//! optional time filter, and an optional row limit. Every shape is a read.

use async_trait::async_trait;
use std::fmt;

use crate::error::Result;
use crate::nlp::{EntityMap, IntentLabel, TimePeriod, Understanding};

use super::QueryStrategy;

/// Table name used when no table entity was detected
pub const UNKNOWN_TABLE: &str = "unknown_table";

/// Row cap for intents without a dedicated template
pub const DEFAULT_LIMIT: u32 = 10;

/// Column projection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Projection {
    All,
    Count,
}

/// A read query built from typed clauses
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectQuery {
    pub projection: Projection,
    pub table: String,
    pub filter: Option<&'static str>,
    pub limit: Option<u32>,
}

impl fmt::Display for SelectQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let columns = match self.projection {
            Projection::All => "*",
            Projection::Count => "COUNT(*)",
        };
        write!(f, "SELECT {} FROM {}", columns, self.table)?;
        if let Some(filter) = self.filter {
            write!(f, " WHERE {}", filter)?;
        }
        if let Some(limit) = self.limit {
            write!(f, " LIMIT {}", limit)?;
        }
        Ok(())
    }
}

/// Time filter for row retrieval.
///
/// `yesterday`, `this_week` and `this_month` have no clause and produce an
/// unfiltered query.
pub fn select_filter(period: TimePeriod) -> Option<&'static str> {
    match period {
        TimePeriod::LastWeek => Some("created_at >= NOW() - INTERVAL '7 days'"),
        TimePeriod::LastMonth => Some("created_at >= NOW() - INTERVAL '1 month'"),
        TimePeriod::Today => Some("DATE(created_at) = CURRENT_DATE"),
        TimePeriod::Yesterday | TimePeriod::ThisWeek | TimePeriod::ThisMonth => None,
    }
}

/// Time filter for counting; only `last_week` is mapped.
pub fn count_filter(period: TimePeriod) -> Option<&'static str> {
    match period {
        TimePeriod::LastWeek => Some("created_at >= NOW() - INTERVAL '7 days'"),
        TimePeriod::LastMonth
        | TimePeriod::Today
        | TimePeriod::Yesterday
        | TimePeriod::ThisWeek
        | TimePeriod::ThisMonth => None,
    }
}

/// Builds the template query for an intent and its entities.
///
/// Insert, update and delete intents degrade to a bounded read: there is no
/// confirmation flow for mutations.
pub fn build_query(intent: IntentLabel, entities: &EntityMap) -> SelectQuery {
    let table = entities
        .table
        .clone()
        .unwrap_or_else(|| UNKNOWN_TABLE.to_string());

    match intent {
        IntentLabel::SelectData => SelectQuery {
            projection: Projection::All,
            table,
            filter: entities.time_period.and_then(select_filter),
            limit: None,
        },
        IntentLabel::CountData => SelectQuery {
            projection: Projection::Count,
            table,
            filter: entities.time_period.and_then(count_filter),
            limit: None,
        },
        IntentLabel::InsertData
        | IntentLabel::UpdateData
        | IntentLabel::DeleteData
        | IntentLabel::Unknown => SelectQuery {
            projection: Projection::All,
            table,
            filter: None,
            limit: Some(DEFAULT_LIMIT),
        },
    }
}

/// Template strategy; infallible
#[derive(Debug, Clone, Default)]
pub struct TemplateSynthesizer;

impl TemplateSynthesizer {
    pub fn new() -> Self {
        Self
    }

    /// Renders the template query for an understanding
    pub fn render(&self, understanding: &Understanding) -> String {
        build_query(understanding.intent(), understanding.entities()).to_string()
    }
}

#[async_trait]
impl QueryStrategy for TemplateSynthesizer {
    async fn synthesize(&self, understanding: &Understanding) -> Result<String> {
        Ok(self.render(understanding))
    }

    fn name(&self) -> &str {
        "template"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(intent: IntentLabel, entities: EntityMap) -> String {
        build_query(intent, &entities).to_string()
    }

    #[test]
    fn test_select_with_last_week() {
        let sql = render(
            IntentLabel::SelectData,
            EntityMap::new()
                .with_table("orders")
                .with_time_period(TimePeriod::LastWeek),
        );
        assert_eq!(
            sql,
            "SELECT * FROM orders WHERE created_at >= NOW() - INTERVAL '7 days'"
        );
    }

    #[test]
    fn test_select_time_filters() {
        let today = render(
            IntentLabel::SelectData,
            EntityMap::new()
                .with_table("logs")
                .with_time_period(TimePeriod::Today),
        );
        assert_eq!(today, "SELECT * FROM logs WHERE DATE(created_at) = CURRENT_DATE");

        let last_month = render(
            IntentLabel::SelectData,
            EntityMap::new().with_time_period(TimePeriod::LastMonth),
        );
        assert_eq!(
            last_month,
            "SELECT * FROM unknown_table WHERE created_at >= NOW() - INTERVAL '1 month'"
        );
    }

    #[test]
    fn test_unmapped_periods_have_no_filter() {
        for period in [TimePeriod::Yesterday, TimePeriod::ThisWeek, TimePeriod::ThisMonth] {
            let sql = render(
                IntentLabel::SelectData,
                EntityMap::new().with_table("users").with_time_period(period),
            );
            assert_eq!(sql, "SELECT * FROM users");
        }
    }

    #[test]
    fn test_count_only_maps_last_week() {
        let sql = render(
            IntentLabel::CountData,
            EntityMap::new()
                .with_table("users")
                .with_time_period(TimePeriod::LastWeek),
        );
        assert_eq!(
            sql,
            "SELECT COUNT(*) FROM users WHERE created_at >= NOW() - INTERVAL '7 days'"
        );

        let sql = render(
            IntentLabel::CountData,
            EntityMap::new()
                .with_table("users")
                .with_time_period(TimePeriod::Today),
        );
        assert_eq!(sql, "SELECT COUNT(*) FROM users");
    }

    #[test]
    fn test_count_without_table() {
        assert_eq!(
            render(IntentLabel::CountData, EntityMap::new()),
            "SELECT COUNT(*) FROM unknown_table"
        );
    }

    #[test]
    fn test_mutating_intents_degrade_to_bounded_read() {
        for intent in [
            IntentLabel::InsertData,
            IntentLabel::UpdateData,
            IntentLabel::DeleteData,
            IntentLabel::Unknown,
        ] {
            let sql = render(
                intent,
                EntityMap::new()
                    .with_table("accounts")
                    .with_time_period(TimePeriod::LastWeek),
            );
            assert_eq!(sql, "SELECT * FROM accounts LIMIT 10");
        }
    }

    #[test]
    fn test_render_is_deterministic() {
        let understanding = Understanding::new(
            IntentLabel::SelectData,
            0.8,
            EntityMap::new().with_table("orders"),
            "show me orders",
        );
        let synthesizer = TemplateSynthesizer::new();
        assert_eq!(synthesizer.render(&understanding), synthesizer.render(&understanding));
    }
}
