//! Lexical entity extraction
//!
//! Pulls at most one table name, one time period and one number out of free
//! text. Every category is first-match-wins; nothing found is not an error.

use regex::Regex;

use super::types::{EntityMap, TimePeriod};

/// Tokens that follow a table keyword but never name a table
const NON_TABLE_WORDS: &[&str] = &[
    "a", "an", "the", "all", "any", "some", "each", "every", "my", "our", "your", "their",
    "this", "that", "these", "those", "last", "next", "today", "yesterday", "tomorrow", "week",
    "month", "year", "which", "what", "where", "of", "in", "from", "to", "for", "on", "at", "by",
    "with", "into", "about", "them", "it",
];

/// Rule-based entity extractor
#[derive(Debug, Clone)]
pub struct EntityExtractor {
    /// Table patterns in priority order
    table_patterns: Vec<Regex>,
    /// Time phrases in detection order
    time_patterns: Vec<(TimePeriod, Regex)>,
    number_pattern: Regex,
}

impl EntityExtractor {
    /// Creates an extractor with the built-in rule set
    pub fn new() -> Self {
        let determiner = r"(?:(?:the|all|my|our|your)\s+)?";
        let table_patterns = ["from", "table", "in"]
            .iter()
            .map(|keyword| {
                Regex::new(&format!(r"\b{}\s+{}([a-z][a-z0-9_]*)", keyword, determiner))
                    .expect("table pattern is valid")
            })
            .chain(std::iter::once(
                Regex::new(r"\ball\s+([a-z][a-z0-9_]*)").expect("table pattern is valid"),
            ))
            .collect();

        let time_patterns = TimePeriod::DETECTION_ORDER
            .iter()
            .map(|period| {
                let phrase = period.as_str().replace('_', r"\s+");
                (*period, Regex::new(&phrase).expect("time pattern is valid"))
            })
            .collect();

        Self {
            table_patterns,
            time_patterns,
            number_pattern: Regex::new(r"[0-9]+").expect("number pattern is valid"),
        }
    }

    /// Extracts entities from text
    pub fn extract(&self, text: &str) -> EntityMap {
        let text_lower = text.to_lowercase();

        EntityMap {
            table: self.extract_table(&text_lower),
            time_period: self.extract_time_period(&text_lower),
            number: self.extract_number(text),
        }
    }

    fn extract_table(&self, text_lower: &str) -> Option<String> {
        self.table_patterns.iter().find_map(|pattern| {
            pattern
                .captures_iter(text_lower)
                .filter_map(|caps| caps.get(1))
                .map(|m| m.as_str())
                .find(|candidate| !NON_TABLE_WORDS.contains(candidate))
                .map(str::to_string)
        })
    }

    fn extract_time_period(&self, text_lower: &str) -> Option<TimePeriod> {
        self.time_patterns
            .iter()
            .find(|(_, pattern)| pattern.is_match(text_lower))
            .map(|(period, _)| *period)
    }

    fn extract_number(&self, text: &str) -> Option<u64> {
        // Only the first literal counts; an overflowing one is not a number entity
        self.number_pattern
            .find(text)
            .and_then(|m| m.as_str().parse::<u64>().ok())
    }
}

impl Default for EntityExtractor {
    fn default() -> Self {
        Self::new()
    }
}
