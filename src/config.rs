//! Service configuration, read from `SEMANTIC_SEARCH_*` environment variables.

use crate::builder::startup::MAX_STARTUP_RETRIES;
use crate::orchestrator::OrchestratorSettings;
use crate::term::{Term, TermBounds};

use anyhow::Context;
use std::net::SocketAddr;
use std::str::FromStr;
use tracing::Level;

pub const ENV_BIND: &str = "SEMANTIC_SEARCH_BIND";
pub const ENV_LOG_LEVEL: &str = "SEMANTIC_SEARCH_LOG_LEVEL";
pub const ENV_BACKEND_URL: &str = "SEMANTIC_SEARCH_BACKEND_URL";
pub const ENV_DEFAULT_TERM: &str = "SEMANTIC_SEARCH_DEFAULT_TERM";
pub const ENV_MIN_YEAR: &str = "SEMANTIC_SEARCH_MIN_YEAR";
pub const ENV_MAX_YEAR: &str = "SEMANTIC_SEARCH_MAX_YEAR";
pub const ENV_STARTUP_RETRIES: &str = "SEMANTIC_SEARCH_STARTUP_RETRIES";

const DEFAULT_BIND: &str = "0.0.0.0:8000";
const DEFAULT_BACKEND_URL: &str = "http://localhost:8080";

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub log_level: Level,
    /// Unrecognized log level that was replaced by `INFO`.
    pub log_level_fallback: Option<String>,
    pub backend_url: String,
    pub default_term: Option<Term>,
    pub bounds: TermBounds,
    pub startup_retries: u32,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup. Unset and blank
    /// values fall back to defaults; malformed ones are errors.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let bind_addr = get(ENV_BIND)
            .unwrap_or_else(|| DEFAULT_BIND.to_string())
            .parse()
            .with_context(|| format!("{} is not a socket address", ENV_BIND))?;

        let raw_log_level = get(ENV_LOG_LEVEL);
        let log_level = parse_log_level(raw_log_level.as_deref());
        let log_level_fallback =
            raw_log_level.filter(|raw| Level::from_str(raw).is_err());

        let backend_url = get(ENV_BACKEND_URL).unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string());

        let defaults = TermBounds::default();
        let bounds = TermBounds {
            min_year: parse_or(get(ENV_MIN_YEAR), ENV_MIN_YEAR, defaults.min_year)?,
            max_year: parse_or(get(ENV_MAX_YEAR), ENV_MAX_YEAR, defaults.max_year)?,
        };
        if bounds.min_year > bounds.max_year {
            anyhow::bail!(
                "{} ({}) is greater than {} ({})",
                ENV_MIN_YEAR,
                bounds.min_year,
                ENV_MAX_YEAR,
                bounds.max_year
            );
        }

        let default_term = get(ENV_DEFAULT_TERM)
            .map(|label| Term::parse_label(&label, &bounds))
            .transpose()
            .with_context(|| format!("{} is not a valid term", ENV_DEFAULT_TERM))?;

        let startup_retries = parse_or(
            get(ENV_STARTUP_RETRIES),
            ENV_STARTUP_RETRIES,
            MAX_STARTUP_RETRIES,
        )?;
        if startup_retries == 0 {
            anyhow::bail!("{} must be at least 1", ENV_STARTUP_RETRIES);
        }

        Ok(Self {
            bind_addr,
            log_level,
            log_level_fallback,
            backend_url,
            default_term,
            bounds,
            startup_retries,
        })
    }

    pub fn orchestrator_settings(&self) -> OrchestratorSettings {
        OrchestratorSettings {
            bounds: self.bounds,
            default_term: self.default_term,
            startup_attempts: self.startup_retries,
        }
    }
}

fn parse_or<T>(value: Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match value {
        Some(raw) => raw
            .parse()
            .with_context(|| format!("{}='{}' is not valid", key, raw)),
        None => Ok(default),
    }
}

/// Unknown levels fall back to `INFO`.
pub fn parse_log_level(value: Option<&str>) -> Level {
    value
        .and_then(|raw| Level::from_str(raw).ok())
        .unwrap_or(Level::INFO)
}
