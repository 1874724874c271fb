//! pgnl-agent command line
//!
//! Usage:
//!   pgnl-agent serve                      # HTTP server on the configured address
//!   pgnl-agent ask "How many users?"      # print understanding and SQL
//!   pgnl-agent ask --execute "..."        # also run it and print the answer
//!   pgnl-agent ask -e --speak a.mp3 "..." # and read the answer aloud into a file
//!   pgnl-agent tables [NAME]              # list tables, or one table's columns
//!   pgnl-agent init-config                # write pgnl-agent.toml.example

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

use pgnl_agent::database::{PostgresExecutor, QueryExecutor};
use pgnl_agent::speech::GoogleSpeechClient;
use pgnl_agent::{config::AppConfig, http_server, logging, QueryAgent};

#[derive(Parser)]
#[command(name = "pgnl-agent")]
#[command(about = "Ask a PostgreSQL database questions in plain language", version)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(short, long, global = true, env = "PGNL_CONFIG")]
    config: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server
    Serve {
        /// Overrides server.bind_addr
        #[arg(short, long)]
        bind: Option<SocketAddr>,
    },
    /// Answer one question from the command line
    Ask {
        text: String,

        /// Run the generated SQL and summarize the result
        #[arg(short, long)]
        execute: bool,

        /// Write the spoken summary as MP3
        #[arg(long, value_name = "FILE", requires = "execute")]
        speak: Option<PathBuf>,
    },
    /// List tables in the public schema, or describe one
    Tables { name: Option<String> },
    /// Write a sample configuration file
    InitConfig {
        #[arg(short, long, default_value = "pgnl-agent.toml.example")]
        output: String,
    },
}

/// Loads, logs and validates configuration for commands that need it
fn load_config(path: Option<&str>) -> Result<AppConfig> {
    let config = AppConfig::load(path)?;
    logging::init(&config.logging)?;
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

async fn speak_to_file(config: &AppConfig, text: &str, path: &Path) -> Result<()> {
    let speech = GoogleSpeechClient::new(config.speech.clone())?;
    let audio = speech.synthesize(text).await?;
    std::fs::write(path, &audio)
        .with_context(|| format!("failed to write {}", path.display()))?;
    info!(path = %path.display(), bytes = audio.len(), "spoken summary written");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    match cli.command {
        Command::Serve { bind } => {
            let config = load_config(config_path)?;
            let agent = Arc::new(QueryAgent::from_config(&config)?);
            let addr = match bind {
                Some(addr) => addr,
                None => config.bind_addr()?,
            };
            info!(%addr, "starting pgnl-agent");
            http_server::serve(agent, addr).await?;
        }
        Command::Ask {
            text,
            execute,
            speak,
        } => {
            let config = load_config(config_path)?;
            let agent = QueryAgent::from_config(&config)?;
            let output = if execute {
                let response = agent.handle_text(&text).await?;
                if let Some(path) = &speak {
                    speak_to_file(&config, &response.message, path).await?;
                }
                serde_json::to_value(response)?
            } else {
                let plan = agent.plan(&text).await;
                json!({
                    "understanding": plan.understanding,
                    "sql_generated": plan.sql,
                })
            };
            agent.shutdown().await;
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Command::Tables { name } => {
            let config = load_config(config_path)?;
            let executor = PostgresExecutor::connect(&config.database).await?;
            let output = match name {
                Some(table) => serde_json::to_value(executor.table_schema(&table).await?)?,
                None => serde_json::to_value(executor.list_tables().await?)?,
            };
            executor.close().await;
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Command::InitConfig { output } => {
            AppConfig::generate_sample_config(&output)?;
            println!("Sample configuration written to {}", output);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tables_command() {
        let cli = Cli::try_parse_from(["pgnl-agent", "tables"]).unwrap();
        assert!(matches!(cli.command, Command::Tables { name: None }));

        let cli = Cli::try_parse_from(["pgnl-agent", "-c", "a.toml", "tables", "orders"]).unwrap();
        assert_eq!(cli.config.as_deref(), Some("a.toml"));
        assert!(matches!(cli.command, Command::Tables { name: Some(ref n) } if n == "orders"));
    }

    #[test]
    fn test_speak_requires_execute() {
        assert!(Cli::try_parse_from(["pgnl-agent", "ask", "--speak", "a.mp3", "hi"]).is_err());

        let cli =
            Cli::try_parse_from(["pgnl-agent", "ask", "-e", "--speak", "a.mp3", "hi"]).unwrap();
        match cli.command {
            Command::Ask {
                text,
                execute,
                speak,
            } => {
                assert_eq!(text, "hi");
                assert!(execute);
                assert_eq!(speak, Some(PathBuf::from("a.mp3")));
            }
            _ => panic!("expected ask"),
        }
    }

    #[test]
    fn test_init_config_default_output() {
        let cli = Cli::try_parse_from(["pgnl-agent", "init-config"]).unwrap();
        assert!(
            matches!(cli.command, Command::InitConfig { ref output } if output == "pgnl-agent.toml.example")
        );
    }
}
