//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::guard::{RateLimitConfig, DEFAULT_MAX_REQUESTS, DEFAULT_WINDOW_SECS};

/// API keys seeded when `API_KEYS` is not set.
pub const DEFAULT_API_KEYS: [&str; 3] = ["validapi1", "validapi2", "validapi3"];

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// SQLite database file
    pub database_path: String,
    /// Requests allowed per client within one window
    pub rate_limit_requests: u32,
    /// Rate limit window length in seconds
    pub rate_limit_window_secs: u64,
    /// How often stale rate limit windows are pruned, in seconds
    pub prune_interval_secs: u64,
    /// API keys seeded into the store at startup
    pub api_keys: Vec<String>,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 5000)
    /// - `DATABASE_PATH` - SQLite file (default: data_store.db)
    /// - `RATE_LIMIT_REQUESTS` - Requests per window (default: 5)
    /// - `RATE_LIMIT_WINDOW_SECS` - Window length in seconds (default: 60)
    /// - `PRUNE_INTERVAL_SECS` - Rate limiter pruning period (default: 60)
    /// - `API_KEYS` - Comma-separated keys to seed (default: validapi1,validapi2,validapi3)
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds a Config from an arbitrary variable source.
    ///
    /// Missing, unparsable or zero numeric values fall back to the default.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let api_keys = lookup("API_KEYS")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|key| !key.is_empty())
                    .map(String::from)
                    .collect::<Vec<_>>()
            })
            .filter(|keys| !keys.is_empty())
            .unwrap_or(defaults.api_keys);

        Self {
            server_port: positive(&lookup, "SERVER_PORT").unwrap_or(defaults.server_port),
            database_path: lookup("DATABASE_PATH")
                .filter(|path| !path.trim().is_empty())
                .unwrap_or(defaults.database_path),
            rate_limit_requests: positive(&lookup, "RATE_LIMIT_REQUESTS")
                .unwrap_or(defaults.rate_limit_requests),
            rate_limit_window_secs: positive(&lookup, "RATE_LIMIT_WINDOW_SECS")
                .unwrap_or(defaults.rate_limit_window_secs),
            prune_interval_secs: positive(&lookup, "PRUNE_INTERVAL_SECS")
                .unwrap_or(defaults.prune_interval_secs),
            api_keys,
        }
    }

    /// Rate limiter settings derived from this config.
    pub fn rate_limit(&self) -> RateLimitConfig {
        RateLimitConfig::new(
            self.rate_limit_requests,
            Duration::from_secs(self.rate_limit_window_secs),
        )
    }
}

fn positive<F, T>(lookup: &F, name: &str) -> Option<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + Default + PartialEq,
{
    lookup(name)
        .and_then(|v| v.trim().parse::<T>().ok())
        .filter(|v| *v != T::default())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 5000,
            database_path: "data_store.db".to_string(),
            rate_limit_requests: DEFAULT_MAX_REQUESTS,
            rate_limit_window_secs: DEFAULT_WINDOW_SECS,
            prune_interval_secs: 60,
            api_keys: DEFAULT_API_KEYS.iter().map(|k| k.to_string()).collect(),
        }
    }
}
