//! Configuration for the Rusty-Board client.
//!
//! Sources, lowest precedence first: built-in defaults, an optional
//! `rusty-board.toml` in the working directory, then `RB_`-prefixed
//! environment variables (`RB_FILTER__CRITERIA=subject`). A `.env` file is
//! loaded into the environment first.

use std::time::Duration;

use config::{Config, Environment, File, Source};
use secrecy::SecretString;
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Initial list filter. Criteria stays a string here; the UI layer parses it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FilterConfig {
    pub search: String,
    pub sort_order: bool,
    pub criteria: String,
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    base_url: String,
    request_timeout_secs: u64,
    log_level: String,
    log_format: LogFormat,
    username: Option<String>,
    password: Option<String>,
    filter: FilterConfig,
}

/// Application configuration.
#[derive(Debug)]
pub struct ClientConfig {
    /// Backend origin, e.g. `http://127.0.0.1:5000`
    pub base_url: String,
    pub request_timeout: Duration,
    /// Default tracing filter; `RUST_LOG` takes precedence
    pub log_level: String,
    pub log_format: LogFormat,
    /// Log in as this user before loading the board
    pub username: Option<String>,
    pub password: Option<SecretString>,
    pub filter: FilterConfig,
}

impl ClientConfig {
    /// Loads `.env`, `rusty-board.toml` and the `RB_` environment.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_sources(vec![
            Box::new(File::with_name("rusty-board").required(false)),
            Box::new(
                Environment::with_prefix("RB")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            ),
        ])
    }

    /// Layers `sources` over the defaults, later sources winning.
    pub fn from_sources(
        sources: Vec<Box<dyn Source + Send + Sync>>,
    ) -> Result<Self, ConfigError> {
        let builder = Config::builder()
            .set_default("base_url", "http://127.0.0.1:5000")?
            .set_default("request_timeout_secs", 10)?
            .set_default("log_level", "info")?
            .set_default("log_format", "pretty")?
            .set_default("filter.search", "")?
            .set_default("filter.sort_order", true)?
            .set_default("filter.criteria", "last-modified")?
            .add_source(sources);

        let raw: RawConfig = builder.build()?.try_deserialize()?;
        Self::validate(raw)
    }

    fn validate(raw: RawConfig) -> Result<Self, ConfigError> {
        if !(raw.base_url.starts_with("http://") || raw.base_url.starts_with("https://")) {
            return Err(ConfigError::Invalid(format!(
                "base_url must be an http(s) URL, got {:?}",
                raw.base_url
            )));
        }
        if raw.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "request_timeout_secs must be positive".to_string(),
            ));
        }
        if raw.username.is_some() != raw.password.is_some() {
            tracing::warn!("username and password must be set together; skipping login");
        }

        Ok(Self {
            base_url: raw.base_url,
            request_timeout: Duration::from_secs(raw.request_timeout_secs),
            log_level: raw.log_level,
            log_format: raw.log_format,
            username: raw.username,
            password: raw.password.map(SecretString::from),
            filter: raw.filter,
        })
    }

    /// Login credentials, when both halves are configured.
    pub fn credentials(&self) -> Option<(&str, &SecretString)> {
        self.username.as_deref().zip(self.password.as_ref())
    }
}
