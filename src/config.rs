// SPDX-License-Identifier: MIT

//! Configuration loaded from environment variables.
//!
//! The API server reads [`Config`]; the tracker client (the replay tool and
//! any embedding app) reads [`ClientConfig`].

use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Flush a batch every this many seconds while tracking.
pub const DEFAULT_FLUSH_INTERVAL_SECS: u64 = 10;
/// Recompute the displayed duration every this many seconds.
pub const DEFAULT_TICK_INTERVAL_SECS: u64 = 1;
/// Flush as soon as this many fixes are buffered.
pub const DEFAULT_FLUSH_THRESHOLD: usize = 8;

/// API server configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Frontend URL allowed by CORS
    pub frontend_url: String,
    /// Server port
    pub port: u16,
    /// Key the auth provider signs session tokens with (raw bytes)
    pub jwt_signing_key: Vec<u8>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            port: parse_var("PORT", 8080)?,
            jwt_signing_key: env::var("JWT_SIGNING_KEY")
                .map_err(|_| ConfigError::Missing("JWT_SIGNING_KEY"))?
                .trim()
                .as_bytes()
                .to_vec(),
        })
    }

    /// Fixed configuration for tests.
    pub fn test_default() -> Self {
        Self {
            frontend_url: "http://localhost:3000".to_string(),
            port: 8080,
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!".to_vec(),
        }
    }
}

/// Batching and scheduling policy for a walk tracker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerConfig {
    pub flush_interval: Duration,
    pub tick_interval: Duration,
    pub flush_threshold: usize,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            flush_interval: Duration::from_secs(DEFAULT_FLUSH_INTERVAL_SECS),
            tick_interval: Duration::from_secs(DEFAULT_TICK_INTERVAL_SECS),
            flush_threshold: DEFAULT_FLUSH_THRESHOLD,
        }
    }
}

impl TrackerConfig {
    /// Read overrides from `WALK_FLUSH_INTERVAL_SECS`, `WALK_TICK_INTERVAL_SECS`
    /// and `WALK_FLUSH_THRESHOLD`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let flush_secs = parse_var("WALK_FLUSH_INTERVAL_SECS", DEFAULT_FLUSH_INTERVAL_SECS)?;
        let tick_secs = parse_var("WALK_TICK_INTERVAL_SECS", DEFAULT_TICK_INTERVAL_SECS)?;
        let flush_threshold = parse_var("WALK_FLUSH_THRESHOLD", DEFAULT_FLUSH_THRESHOLD)?;

        if flush_secs == 0 {
            return Err(ConfigError::Invalid("WALK_FLUSH_INTERVAL_SECS"));
        }
        if tick_secs == 0 {
            return Err(ConfigError::Invalid("WALK_TICK_INTERVAL_SECS"));
        }
        if flush_threshold == 0 {
            return Err(ConfigError::Invalid("WALK_FLUSH_THRESHOLD"));
        }

        Ok(Self {
            flush_interval: Duration::from_secs(flush_secs),
            tick_interval: Duration::from_secs(tick_secs),
            flush_threshold,
        })
    }
}

/// Tracker client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Walk API root, including the `/api` prefix
    pub api_url: String,
    /// Session token issued by the auth provider
    pub session_token: String,
    pub tracker: TrackerConfig,
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Ok(Self {
            api_url: env::var("WALK_API_URL")
                .unwrap_or_else(|_| "http://localhost:8080/api".to_string()),
            session_token: env::var("WALK_SESSION_TOKEN")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("WALK_SESSION_TOKEN"))?,
            tracker: TrackerConfig::from_env()?,
        })
    }
}

fn parse_var<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid(name)),
        Err(_) => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),
}
