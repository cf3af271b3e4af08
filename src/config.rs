//! Configuration and settings management
//!
//! Loads settings from environment variables and defines tunables for the
//! throttle window and the content HTTP client.

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

/// Application settings loaded from environment variables
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    /// Telegram Bot API token
    pub telegram_token: String,

    /// Cat fact API endpoint
    #[serde(default = "default_cat_fact_url")]
    pub cat_fact_url: String,
    /// Joke API endpoint
    #[serde(default = "default_joke_url")]
    pub joke_url: String,
    /// Random fact API endpoint
    #[serde(default = "default_random_fact_url")]
    pub random_fact_url: String,
    /// Age-by-name prediction API endpoint
    #[serde(default = "default_agify_url")]
    pub agify_url: String,
    /// Gender-by-name prediction API endpoint
    #[serde(default = "default_genderize_url")]
    pub genderize_url: String,
}

fn default_cat_fact_url() -> String {
    "https://catfact.ninja/fact".to_string()
}

fn default_joke_url() -> String {
    "https://official-joke-api.appspot.com/random_joke".to_string()
}

fn default_random_fact_url() -> String {
    "https://uselessfacts.jsph.pl/api/v2/facts/random".to_string()
}

fn default_agify_url() -> String {
    "https://api.agify.io".to_string()
}

fn default_genderize_url() -> String {
    "https://api.genderize.io".to_string()
}

impl Settings {
    /// Create new settings by loading from environment and files
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if loading fails or `telegram_token` is absent.
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = Config::builder()
            // Start off by merging in the "default" configuration file
            .add_source(File::with_name("config/default").required(false))
            // Add in the current environment file
            .add_source(File::with_name(&format!("config/{run_mode}")).required(false))
            // Add in a local configuration file
            // This file shouldn't be checked into git
            .add_source(File::with_name("config/local").required(false))
            // Add in settings from the environment (with a prefix of APP)
            .add_source(Environment::with_prefix("APP").separator("__"))
            // Also add settings from environment variables directly (without prefix)
            // ignore_empty treats empty env vars as unset
            .add_source(Environment::default().ignore_empty(true))
            .build()?;

        s.try_deserialize()
    }
}

fn env_u64(name: &str, default: u64) -> u64 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Minimum interval between accepted messages from one user, in seconds
#[must_use]
pub fn get_throttle_interval() -> u64 {
    env_u64("THROTTLE_INTERVAL_SECS", 1)
}

/// Time-to-live for throttle notice entries, in seconds
#[must_use]
pub fn get_throttle_cache_ttl() -> u64 {
    env_u64("THROTTLE_CACHE_TTL_SECS", 600)
}

/// Maximum number of entries in the throttle cache
#[must_use]
pub fn get_throttle_cache_max_size() -> u64 {
    env_u64("THROTTLE_CACHE_MAX_SIZE", 10_000)
}

/// Timeout for content API requests, in seconds
#[must_use]
pub fn get_content_http_timeout_secs() -> u64 {
    env_u64("CONTENT_HTTP_TIMEOUT_SECS", 10)
}
