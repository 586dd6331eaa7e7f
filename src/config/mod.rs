//! Typed configuration from environment variables.
//!
//! Loads once at startup. Only `DATABASE_URL` is sensitive; it is wrapped
//! in secrecy::SecretString to prevent log leaks and is required only by
//! the commands that talk to the database.

pub mod secrets;

use crate::error::{Error, Result};
use secrecy::SecretString;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_ASSET_DIR: &str = "assets/images";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

#[derive(Debug)]
pub struct Config {
    pub database_url: Option<SecretString>,
    pub asset_dir: PathBuf,
    pub http: HttpConfig,
    /// Per-item limit covering both the idempotency check and the action.
    pub action_timeout: Option<Duration>,
    pub otel_endpoint: Option<String>,
    pub log_level: String,
}

/// Settings for the HTTP transport. Passed to `Fetcher::new`; nothing here
/// touches process-wide state.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub accept_invalid_certs: bool,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            accept_invalid_certs: false,
            timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            user_agent: concat!("provisioner/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// In local dev, call `dotenvy::dotenv().ok()` before this.
    pub fn from_env() -> Result<Self> {
        let http = HttpConfig {
            accept_invalid_certs: flag_var("PROVISION_INSECURE_TLS")?,
            timeout: Duration::from_secs(
                secs_var("PROVISION_HTTP_TIMEOUT_SECS")?.unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS),
            ),
            ..HttpConfig::default()
        };

        Ok(Self {
            database_url: std::env::var("DATABASE_URL").ok().map(SecretString::from),
            asset_dir: std::env::var("PROVISION_ASSET_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_ASSET_DIR)),
            http,
            action_timeout: secs_var("PROVISION_ACTION_TIMEOUT_SECS")?.map(Duration::from_secs),
            otel_endpoint: std::env::var("OTEL_ENDPOINT").ok(),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// The database URL, or a config error naming the missing variable.
    pub fn database_url(&self) -> Result<&SecretString> {
        self.database_url.as_ref().ok_or_else(|| {
            Error::Config("required environment variable DATABASE_URL is not set".to_string())
        })
    }
}

fn flag_var(name: &str) -> Result<bool> {
    match std::env::var(name) {
        Ok(value) => parse_flag(&value)
            .ok_or_else(|| Error::Config(format!("{name} must be a boolean, got {value:?}"))),
        Err(_) => Ok(false),
    }
}

/// A positive number of seconds; zero would fail every item at once.
fn secs_var(name: &str) -> Result<Option<u64>> {
    let Ok(value) = std::env::var(name) else {
        return Ok(None);
    };
    match value.trim().parse::<u64>() {
        Ok(0) | Err(_) => Err(Error::Config(format!(
            "{name} must be a positive number of seconds, got {value:?}"
        ))),
        Ok(secs) => Ok(Some(secs)),
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}
