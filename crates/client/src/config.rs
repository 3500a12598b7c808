//! Client configuration: defaults overlaid with `STOREADMIN_*` environment variables.

use std::time::Duration;

use storeadmin_core::DomainError;
use storeadmin_inventory::{Pagination, Thresholds};
use thiserror::Error;

pub const DEFAULT_API_URL: &str = "http://localhost:5000";
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub const ENV_API_URL: &str = "STOREADMIN_API_URL";
pub const ENV_POLL_INTERVAL_SECS: &str = "STOREADMIN_POLL_INTERVAL_SECS";
pub const ENV_REQUEST_TIMEOUT_SECS: &str = "STOREADMIN_REQUEST_TIMEOUT_SECS";
pub const ENV_CRITICAL_THRESHOLD: &str = "STOREADMIN_CRITICAL_THRESHOLD";
pub const ENV_LOW_THRESHOLD: &str = "STOREADMIN_LOW_THRESHOLD";
pub const ENV_ROWS_PER_PAGE: &str = "STOREADMIN_ROWS_PER_PAGE";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: '{value}'")]
    Invalid { key: &'static str, value: String },

    #[error(transparent)]
    Domain(#[from] DomainError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_url: String,
    pub poll_interval: Duration,
    /// Upper bound on a single backend call, connect to last byte.
    pub request_timeout: Duration,
    pub thresholds: Thresholds,
    pub rows_per_page: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            thresholds: Thresholds::default(),
            rows_per_page: Pagination::inventory_default().rows_per_page,
        }
    }
}

impl ClientConfig {
    /// Defaults overlaid with the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overlaid with whatever `lookup` returns for each `STOREADMIN_*` key.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup(ENV_API_URL).filter(|v| !v.trim().is_empty()) {
            config.api_url = url.trim().trim_end_matches('/').to_string();
        }
        if let Some(interval) = parse_secs(&lookup, ENV_POLL_INTERVAL_SECS)? {
            config.poll_interval = interval;
        }
        if let Some(timeout) = parse_secs(&lookup, ENV_REQUEST_TIMEOUT_SECS)? {
            config.request_timeout = timeout;
        }

        let critical = parse_var::<i64, _>(&lookup, ENV_CRITICAL_THRESHOLD)?;
        let low = parse_var::<i64, _>(&lookup, ENV_LOW_THRESHOLD)?;
        if critical.is_some() || low.is_some() {
            config.thresholds = Thresholds::new(
                critical.unwrap_or(config.thresholds.critical()),
                low.unwrap_or(config.thresholds.low()),
            )?;
        }

        if let Some(rows) = parse_var::<usize, _>(&lookup, ENV_ROWS_PER_PAGE)? {
            config.rows_per_page = rows;
        }

        Ok(config)
    }
}

fn parse_var<T, F>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: core::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { key, value: raw }),
    }
}

/// A whole number of seconds, zero excluded.
fn parse_secs<F>(lookup: &F, key: &'static str) -> Result<Option<Duration>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match parse_var::<u64, _>(lookup, key)? {
        Some(0) => Err(ConfigError::Invalid {
            key,
            value: "0".to_string(),
        }),
        secs => Ok(secs.map(Duration::from_secs)),
    }
}
