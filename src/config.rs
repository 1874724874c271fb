//! Application configuration
//!
//! Sources are layered, later ones winning: built-in defaults, an optional
//! TOML file, `PGNL_`-prefixed environment variables (`__` separates nested
//! keys, e.g. `PGNL_DATABASE__HOST`), then the flat variables used by earlier
//! deployments (`DATABASE_URL`, `DB_HOST`, `GEMINI_API_KEY`, ...).

use anyhow::{bail, Context, Result};
use config::{Config, Environment, File};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;

use crate::database::DatabaseConfig;
use crate::llm::LlmConfig;
use crate::logging::LogConfig;
use crate::nlp::DialogflowConfig;
use crate::speech::SpeechConfig;

const DEFAULT_GEMINI_MODEL: &str = "gemini-pro";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    /// Remote intent classification; local rules only when unset
    #[serde(default)]
    pub dialogflow: Option<DialogflowConfig>,
    /// Generative SQL backend; templates only when unset
    #[serde(default)]
    pub generative: Option<LlmConfig>,
    pub speech: SpeechConfig,
    pub logging: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind_addr: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                bind_addr: "0.0.0.0:8000".to_string(),
            },
            database: DatabaseConfig::default(),
            dialogflow: None,
            generative: None,
            speech: SpeechConfig::default(),
            logging: LogConfig::default(),
        }
    }
}

fn secret(value: String) -> SecretString {
    SecretString::new(value.into_boxed_str())
}

impl AppConfig {
    /// Loads from the standard locations and the process environment
    pub fn load(path: Option<&str>) -> Result<Self> {
        ConfigLoader::new().load_from_file(path).load_from_env().build()
    }

    /// Applies the flat legacy variables, read through `lookup`
    pub fn apply_legacy_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.is_empty());

        // database
        if let Some(url) = var("DATABASE_URL") {
            self.database.url = Some(url);
        }
        if let Some(host) = var("DB_HOST") {
            self.database.host = host;
        }
        if let Some(port) = var("DB_PORT") {
            self.database.port = port
                .parse()
                .with_context(|| format!("DB_PORT is not a valid port: {}", port))?;
        }
        if let Some(name) = var("DB_NAME") {
            self.database.name = name;
        }
        if let Some(user) = var("DB_USER") {
            self.database.user = user;
        }
        if let Some(password) = var("DB_PASSWORD") {
            self.database.password = Some(secret(password));
        }

        // shared Google credential
        let google_token = var("GOOGLE_ACCESS_TOKEN");
        if let Some(token) = google_token.clone() {
            self.speech.access_token = Some(secret(token));
        }

        // dialogflow
        if let Some(project_id) = var("DIALOGFLOW_PROJECT_ID") {
            match self.dialogflow.as_mut() {
                Some(dialogflow) => dialogflow.project_id = project_id,
                None => self.dialogflow = Some(DialogflowConfig::new(project_id)),
            }
        }
        if let Some(dialogflow) = self.dialogflow.as_mut() {
            if let Some(session_id) = var("DIALOGFLOW_SESSION_ID") {
                dialogflow.session_id = Some(session_id);
            }
            if let Some(language_code) = var("DIALOGFLOW_LANGUAGE_CODE") {
                dialogflow.language_code = language_code;
            }
            if let Some(token) = var("DIALOGFLOW_ACCESS_TOKEN").or(google_token) {
                dialogflow.access_token = Some(secret(token));
            }
        }

        // generative backend
        if let Some(api_key) = var("GEMINI_API_KEY") {
            let model = var("GEMINI_MODEL")
                .or_else(|| self.generative.as_ref().map(|g| g.default_model.clone()))
                .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string());
            self.generative = Some(LlmConfig::gemini(api_key, model));
        } else if let (Some(model), Some(generative)) = (var("GEMINI_MODEL"), self.generative.as_mut()) {
            generative.default_model = model;
        }

        // speech
        if let Some(language_code) = var("SPEECH_LANGUAGE_CODE") {
            self.speech.language_code = language_code;
        }
        if let Some(encoding) = var("SPEECH_ENCODING") {
            self.speech.encoding = encoding;
        }
        if let Some(rate) = var("SPEECH_SAMPLE_RATE") {
            self.speech.sample_rate_hertz = rate
                .parse()
                .with_context(|| format!("SPEECH_SAMPLE_RATE is not a number: {}", rate))?;
        }

        // logging
        if let Some(level) = var("LOG_LEVEL") {
            self.logging.level = level.to_lowercase();
        }
        if var("DEBUG").is_some_and(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes")) {
            self.logging.level = "debug".to_string();
        }

        Ok(())
    }

    /// Connection string for the database, preferring `database.url`
    pub fn database_url(&self) -> String {
        self.database.connection_string()
    }

    pub fn bind_addr(&self) -> Result<SocketAddr> {
        self.server
            .bind_addr
            .parse()
            .with_context(|| format!("invalid bind address: {}", self.server.bind_addr))
    }

    pub fn validate(&self) -> Result<()> {
        self.bind_addr()?;
        self.database.validate()?;

        if let Some(dialogflow) = &self.dialogflow {
            if dialogflow.project_id.trim().is_empty() {
                bail!("dialogflow.project_id must not be empty");
            }
        }

        if let Some(generative) = &self.generative {
            generative.validate()?;
        }

        if self.speech.sample_rate_hertz == 0 {
            bail!("speech.sample_rate_hertz must be positive");
        }

        Ok(())
    }

    /// Commented sample configuration file
    pub fn sample_toml() -> Result<String> {
        let mut sample = AppConfig::default();
        sample.server.bind_addr = "127.0.0.1:8000".to_string();
        sample.database.name = "shop".to_string();
        sample.dialogflow = Some(DialogflowConfig::new("your-gcp-project"));
        sample.generative = Some(LlmConfig::gemini("", DEFAULT_GEMINI_MODEL));

        let toml_content =
            toml::to_string_pretty(&sample).context("Failed to serialize sample configuration")?;

        Ok(format!(
            r#"# pgnl-agent configuration
#
# Save as pgnl-agent.toml (or config/pgnl-agent.toml).
# Any key can be overridden from the environment, e.g.
#   PGNL_SERVER__BIND_ADDR=0.0.0.0:8000
#   PGNL_DATABASE__HOST=db.internal
#
# Secrets are never written here. Provide them through the environment:
#   DB_PASSWORD          database password
#   GEMINI_API_KEY       enables generative SQL
#   GOOGLE_ACCESS_TOKEN  Speech-to-Text, Text-to-Speech and Dialogflow
#   DIALOGFLOW_ACCESS_TOKEN overrides the token used for Dialogflow
#
# Remove the [dialogflow] or [generative] sections to use only the local
# intent rules and SQL templates.

{}"#,
            toml_content
        ))
    }

    /// Writes [`AppConfig::sample_toml`] to `path`
    pub fn generate_sample_config(path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        std::fs::write(path, Self::sample_toml()?)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }
}

/// Configuration loader with builder pattern
pub struct ConfigLoader {
    config_file: Option<String>,
    load_env: bool,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self {
            config_file: None,
            load_env: false,
        }
    }

    /// Explicit configuration file; the standard locations are used when `None`
    pub fn load_from_file(mut self, path: Option<&str>) -> Self {
        self.config_file = path.map(String::from);
        self
    }

    /// Read `PGNL_*` and the legacy variables from the process environment
    pub fn load_from_env(mut self) -> Self {
        self.load_env = true;
        self
    }

    pub fn build(self) -> Result<AppConfig> {
        let mut builder = Config::builder().add_source(Config::try_from(&AppConfig::default())?);

        if let Some(config_path) = &self.config_file {
            builder = builder.add_source(File::with_name(config_path).required(true));
        } else {
            builder = builder
                .add_source(File::with_name("pgnl-agent").required(false))
                .add_source(File::with_name("config/pgnl-agent").required(false));
        }

        if self.load_env {
            builder = builder.add_source(
                Environment::with_prefix("PGNL")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );
        }

        let mut config: AppConfig = builder
            .build()
            .context("Failed to build configuration")?
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        if self.load_env {
            config.apply_legacy_env(|key| std::env::var(key).ok())?;
        }

        Ok(config)
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
