//! Client configuration, read from the environment.

use std::env;
use std::time::Duration;

use anyhow::{anyhow, Context};

pub const DEFAULT_API_URL: &str = "http://localhost:8080";
pub const DEFAULT_DEBOUNCE_MS: u64 = 500;
pub const DEFAULT_PAGE_SIZE: u32 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_url: String,
    pub request_timeout_seconds: u64,
    pub filter_debounce_ms: u64,
    pub page_size: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            api_url: DEFAULT_API_URL.to_string(),
            request_timeout_seconds: 30,
            filter_debounce_ms: DEFAULT_DEBOUNCE_MS,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup; unset keys take defaults.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = ClientConfig::default();
        let config = ClientConfig {
            api_url: lookup("INVOICE_API_URL")
                .unwrap_or(defaults.api_url)
                .trim_end_matches('/')
                .to_string(),
            request_timeout_seconds: parse_or(&lookup, "INVOICE_API_TIMEOUT_SECONDS", defaults.request_timeout_seconds)?,
            filter_debounce_ms: parse_or(&lookup, "INVOICE_FILTER_DEBOUNCE_MS", defaults.filter_debounce_ms)?,
            page_size: parse_or(&lookup, "INVOICE_PAGE_SIZE", defaults.page_size)?,
        };

        if config.page_size == 0 {
            return Err(anyhow!("INVOICE_PAGE_SIZE must be greater than zero"));
        }
        if config.api_url.is_empty() {
            return Err(anyhow!("INVOICE_API_URL must not be empty"));
        }
        Ok(config)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    pub fn debounce_window(&self) -> Duration {
        Duration::from_millis(self.filter_debounce_ms)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> anyhow::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} has an invalid value '{}'", key, raw)),
        None => Ok(default),
    }
}
