//! Query synthesis
//!
//! Turns an [`Understanding`] into one SQL statement. Strategies are tried in
//! the order they were added; the deterministic template strategy always runs
//! last and cannot fail.

pub mod generative;
pub mod template;

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, error, warn};

use crate::error::Result;
use crate::nlp::Understanding;

pub use generative::GenerativeSynthesizer;
pub use template::{SelectQuery, TemplateSynthesizer};

/// Statement keywords accepted from any strategy
pub const ACCEPTED_KEYWORDS: [&str; 4] = ["SELECT", "INSERT", "UPDATE", "DELETE"];

/// Returned when no strategy yields an acceptable statement
pub const SAFE_FALLBACK_SQL: &str = "SELECT 1";

/// True when the first whitespace-delimited token is an accepted keyword
pub fn is_accepted_statement(sql: &str) -> bool {
    sql.split_whitespace()
        .next()
        .map(|token| {
            ACCEPTED_KEYWORDS
                .iter()
                .any(|keyword| token.eq_ignore_ascii_case(keyword))
        })
        .unwrap_or(false)
}

/// One way of producing SQL from an understanding
#[async_trait]
pub trait QueryStrategy: Send + Sync {
    async fn synthesize(&self, understanding: &Understanding) -> Result<String>;

    fn name(&self) -> &str;
}

/// Ordered synthesis chain ending in the template strategy
pub struct QuerySynthesizer {
    strategies: Vec<Arc<dyn QueryStrategy>>,
    template: TemplateSynthesizer,
}

impl QuerySynthesizer {
    /// Template-only synthesizer
    pub fn new() -> Self {
        Self {
            strategies: Vec::new(),
            template: TemplateSynthesizer::new(),
        }
    }

    /// Adds a strategy ahead of the template fallback
    pub fn with_strategy(mut self, strategy: Arc<dyn QueryStrategy>) -> Self {
        self.strategies.push(strategy);
        self
    }

    pub fn strategy_names(&self) -> Vec<String> {
        self.strategies
            .iter()
            .map(|s| s.name().to_string())
            .chain(std::iter::once(
                QueryStrategy::name(&self.template).to_string(),
            ))
            .collect()
    }

    /// Produces one statement; never fails.
    ///
    /// Each strategy is attempted once. Errors and unacceptable output move on
    /// to the next strategy.
    pub async fn synthesize(&self, understanding: &Understanding) -> String {
        for strategy in &self.strategies {
            match strategy.synthesize(understanding).await {
                Ok(sql) if is_accepted_statement(&sql) => {
                    debug!(strategy = strategy.name(), sql = %sql, "query synthesized");
                    return sql;
                }
                Ok(sql) => {
                    warn!(
                        strategy = strategy.name(),
                        sql = %sql,
                        "strategy returned an unaccepted statement, falling back"
                    );
                }
                Err(e) if e.is_recoverable() => {
                    warn!(
                        strategy = strategy.name(),
                        error = %e,
                        "query strategy failed, falling back"
                    );
                }
                Err(e) => {
                    error!(
                        strategy = strategy.name(),
                        error = %e,
                        "unexpected query strategy error, falling back"
                    );
                }
            }
        }

        let sql = self.template.render(understanding);
        if is_accepted_statement(&sql) {
            debug!(strategy = "template", sql = %sql, "query synthesized");
            sql
        } else {
            warn!(sql = %sql, "template produced an unaccepted statement");
            SAFE_FALLBACK_SQL.to_string()
        }
    }
}

impl Default for QuerySynthesizer {
    fn default() -> Self {
        Self::new()
    }
}
