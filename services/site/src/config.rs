//! services/site/src/config.rs
//!
//! Defines the site's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development. Every variable except the generation
//! credential has a default matching the published event page.

use chrono::{DateTime, Utc};
use std::{net::SocketAddr, time::Duration};
use tracing::Level;

const DEFAULT_RSVP_ENDPOINT: &str = "https://script.google.com/macros/s/AKfycbyUpd7-ku4gQwdKcj8c6kSE9zX88GboD6Fk5dYR_ZcFq_cDmANsWI3pTKdYtqHqY9HH0g/exec";
const DEFAULT_GENERATION_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/openai";
const DEFAULT_EVENT_DATE: &str = "2026-11-21T00:00:00+02:00";
const DEFAULT_RSVP_TIMEOUT_SECS: u64 = 15;
const DEFAULT_GENERATION_TIMEOUT_SECS: u64 = 30;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub log_level: Level,
    pub allowed_origin: String,
    pub couple_names: String,
    pub event_date: DateTime<Utc>,
    pub rsvp_endpoint_url: String,
    /// Upper bound on one intake POST, connect through response.
    pub rsvp_timeout: Duration,
    pub gemini_api_key: Option<String>,
    pub generation_api_base: String,
    pub generation_model: String,
    pub generation_timeout: Duration,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        // --- Server Settings ---
        let bind_address_str = var_or("BIND_ADDRESS", "0.0.0.0:3000");
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let log_level_str = var_or("RUST_LOG", "INFO");
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let allowed_origin = var_or("ALLOWED_ORIGIN", "http://localhost:3000");

        // --- Event Settings ---
        let couple_names = var_or("COUPLE_NAMES", "Lourens and Ané");
        if couple_names.trim().is_empty() {
            return Err(ConfigError::MissingVar("COUPLE_NAMES".to_string()));
        }

        let event_date_str = var_or("EVENT_DATE", DEFAULT_EVENT_DATE);
        let event_date = DateTime::parse_from_rfc3339(&event_date_str)
            .map(|date| date.with_timezone(&Utc))
            .map_err(|e| ConfigError::InvalidValue("EVENT_DATE".to_string(), e.to_string()))?;

        let rsvp_endpoint_url = var_or("RSVP_ENDPOINT_URL", DEFAULT_RSVP_ENDPOINT);
        let rsvp_timeout = parse_timeout(&lookup, "RSVP_TIMEOUT_SECS", DEFAULT_RSVP_TIMEOUT_SECS)?;

        // --- Generation Provider (credential is optional) ---
        let gemini_api_key = lookup("GEMINI_API_KEY").filter(|key| !key.trim().is_empty());
        let generation_api_base = var_or("GENERATION_API_BASE", DEFAULT_GENERATION_API_BASE);
        let generation_model = var_or("GENERATION_MODEL", "gemini-3-flash-preview");
        let generation_timeout = parse_timeout(
            &lookup,
            "GENERATION_TIMEOUT_SECS",
            DEFAULT_GENERATION_TIMEOUT_SECS,
        )?;

        Ok(Self {
            bind_address,
            log_level,
            allowed_origin,
            couple_names,
            event_date,
            rsvp_endpoint_url,
            rsvp_timeout,
            gemini_api_key,
            generation_api_base,
            generation_model,
            generation_timeout,
        })
    }
}

/// Reads a whole number of seconds. Zero is rejected: it would fail every request.
fn parse_timeout<F>(lookup: &F, key: &str, default_secs: u64) -> Result<Duration, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return Ok(Duration::from_secs(default_secs));
    };
    match raw.trim().parse::<u64>() {
        Ok(0) => Err(ConfigError::InvalidValue(
            key.to_string(),
            "the timeout must be at least one second".to_string(),
        )),
        Ok(secs) => Ok(Duration::from_secs(secs)),
        Err(e) => Err(ConfigError::InvalidValue(key.to_string(), e.to_string())),
    }
}
