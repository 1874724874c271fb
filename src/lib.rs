//! # pgnl-agent
//!
//! Natural-language and voice front end for PostgreSQL.
//!
//! A request flows through four stages:
//!
//! 1. [`nlp::UnderstandingPipeline`] extracts entities and classifies intent,
//!    trying Dialogflow first when configured and local rules otherwise.
//! 2. [`sql::QuerySynthesizer`] renders SQL, trying a generative backend first
//!    when configured and falling back to deterministic templates.
//! 3. A [`database::QueryExecutor`] runs the statement.
//! 4. [`summarizer::ResponseSummarizer`] turns the result into a sentence.
//!
//! [`agent::QueryAgent`] composes the stages; [`http_server`] exposes them.

pub mod agent;
pub mod config;
pub mod database;
pub mod error;
pub mod http_server;
pub mod llm;
pub mod logging;
pub mod nlp;
pub mod speech;
pub mod sql;
pub mod summarizer;

pub use agent::{QueryAgent, QueryPlan, QueryResponse};
pub use error::{Error, Result};
pub use nlp::{IntentLabel, Understanding, UnderstandingPipeline};
pub use sql::QuerySynthesizer;
pub use summarizer::ResponseSummarizer;
