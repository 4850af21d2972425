//! Configuration management for Feedcast
//!
//! Everything is read from environment-style variables. The binary may first
//! populate the environment from a `.env` file (see [`load_env_file`]); values
//! already present in the process environment always win.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use crate::error::{ConfigError, Result};
use crate::types::PublishMode;

pub const DEFAULT_FEED_URL: &str = "https://techsquad.rocks/index.json";
pub const DEFAULT_INSTANCE_URL: &str = "https://mastodon.social";

/// Environment variable naming an explicit `.env` file
pub const ENV_FILE_VAR: &str = "FEEDCAST_ENV_FILE";

#[derive(Debug)]
pub struct Config {
    /// Account whose recent posts are checked for duplicates
    pub account: String,
    pub credentials: Credentials,
    /// How many recent posts to fetch for the duplicate check
    pub history_lookback: u32,
    /// Retry bound for duplicate draws
    pub max_retries: u32,
    pub mode: PublishMode,
    pub feed_url: String,
    pub instance_url: String,
}

/// API credentials. `Debug` output is redacted by `secrecy`.
#[derive(Debug)]
pub struct Credentials {
    pub consumer_key: SecretString,
    pub consumer_secret: SecretString,
    pub access_key: SecretString,
    pub access_secret: SecretString,
}

impl Credentials {
    /// Bearer token presented to the platform API
    pub fn access_token(&self) -> &str {
        self.access_key.expose_secret()
    }
}

impl Config {
    /// Build configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from a fixed set of variables
    pub fn from_map(vars: &HashMap<String, String>) -> Result<Self> {
        Self::from_lookup(|key| vars.get(key).cloned())
    }

    /// Build configuration from any variable lookup
    ///
    /// Required settings are checked in a fixed order and the first missing
    /// one is reported by name.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let account = required(&lookup, "ACCOUNT_IDENTIFIER")?;
        let consumer_key = required(&lookup, "API_CONSUMER_KEY")?;
        let consumer_secret = required(&lookup, "API_CONSUMER_SECRET")?;
        let access_key = required(&lookup, "API_ACCESS_KEY")?;
        let access_secret = required(&lookup, "API_ACCESS_SECRET")?;

        let history_lookback = parse_count(lookup("HISTORY_LOOKBACK_COUNT"));
        let max_retries = parse_count(lookup("MAX_RETRIES"));
        let mode = PublishMode::from_run_mode(lookup("RUN_MODE").as_deref());

        let feed_url = lookup("FEED_URL")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_FEED_URL.to_string());
        let instance_url = normalize_instance_url(
            &lookup("INSTANCE_URL")
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| DEFAULT_INSTANCE_URL.to_string()),
        );

        Ok(Self {
            account,
            credentials: Credentials {
                consumer_key: SecretString::from(consumer_key),
                consumer_secret: SecretString::from(consumer_secret),
                access_key: SecretString::from(access_key),
                access_secret: SecretString::from(access_secret),
            },
            history_lookback,
            max_retries,
            mode,
            feed_url,
            instance_url,
        })
    }
}

fn required<F>(lookup: &F, key: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(ConfigError::MissingField(key.to_string()).into()),
    }
}

/// Missing, negative or otherwise unparsable counts fall back to 0
fn parse_count(value: Option<String>) -> u32 {
    value.and_then(|v| v.parse::<u32>().ok()).unwrap_or(0)
}

/// Ensure the instance URL has a scheme
pub fn normalize_instance_url(instance: &str) -> String {
    if instance.starts_with("http://") || instance.starts_with("https://") {
        instance.to_string()
    } else {
        format!("https://{}", instance)
    }
}

/// Populate the process environment from a `.env` file
///
/// Lookup order:
/// 1. `$FEEDCAST_ENV_FILE` (must be readable)
/// 2. `./.env`
/// 3. `<config dir>/feedcast/.env`
///
/// Returns the file that was loaded, if any. Missing implicit files are not
/// an error.
pub fn load_env_file() -> Result<Option<PathBuf>> {
    if let Ok(explicit) = std::env::var(ENV_FILE_VAR) {
        let path = PathBuf::from(shellexpand::tilde(&explicit).to_string());
        load_env_file_from(&path)?;
        return Ok(Some(path));
    }

    if let Ok(path) = dotenvy::dotenv() {
        debug!("Loaded environment from {}", path.display());
        return Ok(Some(path));
    }

    if let Some(config_dir) = dirs::config_dir() {
        let path = config_dir.join("feedcast").join(".env");
        if path.exists() {
            load_env_file_from(&path)?;
            return Ok(Some(path));
        }
    }

    Ok(None)
}

/// Load a specific `.env` file without overriding existing variables
pub fn load_env_file_from(path: &Path) -> Result<()> {
    dotenvy::from_path(path)
        .map_err(|e| ConfigError::EnvFile(format!("{}: {}", path.display(), e)))?;
    debug!("Loaded environment from {}", path.display());
    Ok(())
}
