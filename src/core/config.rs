//! Configuration management for the toolcast servers.
//!
//! This module provides a centralized configuration structure that is
//! populated once at process start from environment variables (with sane
//! defaults) and passed to the components that need it. Each server binary
//! supplies its own instance name and default port.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::transport::SseConfig;

/// Main configuration structure for a toolcast server process.
///
/// This struct contains all configurable aspects of the server, organized
/// by concern for clarity and maintainability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server identification and metadata.
    pub server: ServerConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,

    /// SSE transport configuration.
    pub transport: SseConfig,

    /// Dispatch limits (per-call timeout, concurrency ceiling).
    pub limits: LimitsConfig,

    /// External API credentials configuration.
    pub credentials: CredentialsConfig,
}

/// Server identification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The name of the server as reported to clients.
    pub name: String,

    /// The version of the server.
    pub version: String,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "trace").
    pub level: String,
}

/// Dispatch limits applied by the dispatcher.
///
/// A slow or wedged tool handler must not stall the session, and a burst of
/// concurrent calls must not exhaust the process, so both bounds are
/// mandatory with overridable defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Per-call execution budget in seconds.
    pub call_timeout_secs: u64,

    /// Maximum number of simultaneously executing tool handlers.
    pub max_concurrent_calls: usize,

    /// Grace period for draining in-flight calls at shutdown, in seconds.
    pub shutdown_grace_secs: u64,
}

impl LimitsConfig {
    /// The per-call execution budget as a [`Duration`].
    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_secs)
    }

    /// The shutdown grace period as a [`Duration`].
    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_secs)
    }
}

/// Configuration for external API credentials.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct CredentialsConfig {
    /// CWA Open Data API key for the weather tool.
    /// The API serves a limited dataset without one.
    pub cwa_api_key: Option<String>,

    /// SerpAPI key for the flight search tool.
    /// Required at call time by the flights handler.
    pub serpapi_api_key: Option<String>,
}

/// Custom Debug implementation to redact secrets from logs.
impl std::fmt::Debug for CredentialsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialsConfig")
            .field("cwa_api_key", &self.cwa_api_key.as_ref().map(|_| "[REDACTED]"))
            .field(
                "serpapi_api_key",
                &self.serpapi_api_key.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            call_timeout_secs: 30,
            max_concurrent_calls: 32,
            shutdown_grace_secs: 5,
        }
    }
}

impl Config {
    /// Create a configuration with default values for the given instance.
    pub fn with_defaults(name: &str, default_port: u16) -> Self {
        Self {
            server: ServerConfig {
                name: name.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
            },
            transport: SseConfig::with_port(default_port),
            limits: LimitsConfig::default(),
            credentials: CredentialsConfig::default(),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Shared settings are prefixed with `TOOLCAST_` (for example
    /// `TOOLCAST_PORT`, `TOOLCAST_LOG_LEVEL`); upstream API credentials keep
    /// the names their providers document (`CWA_API_KEY`, `SERPAPI_API_KEY`).
    pub fn from_env(name: &str, default_port: u16) -> Self {
        dotenvy::dotenv().ok();

        let mut config = Self::with_defaults(name, default_port);

        if let Ok(level) = std::env::var("TOOLCAST_LOG_LEVEL") {
            config.logging.level = level;
        }

        config.transport = SseConfig::from_env(default_port);

        if let Ok(secs) = std::env::var("TOOLCAST_CALL_TIMEOUT_SECS") {
            config.limits.call_timeout_secs = secs
                .parse()
                .unwrap_or(config.limits.call_timeout_secs);
        }

        if let Ok(limit) = std::env::var("TOOLCAST_MAX_CONCURRENT_CALLS") {
            config.limits.max_concurrent_calls = limit
                .parse()
                .unwrap_or(config.limits.max_concurrent_calls);
        }

        if let Ok(secs) = std::env::var("TOOLCAST_SHUTDOWN_GRACE_SECS") {
            config.limits.shutdown_grace_secs = secs
                .parse()
                .unwrap_or(config.limits.shutdown_grace_secs);
        }

        if let Ok(key) = std::env::var("CWA_API_KEY") {
            config.credentials.cwa_api_key = Some(key);
        }

        if let Ok(key) = std::env::var("SERPAPI_API_KEY") {
            config.credentials.serpapi_api_key = Some(key);
        } else {
            warn!(
                "SERPAPI_API_KEY not set - flight search calls will fail until \
                 a key is provided (get one at https://serpapi.com)"
            );
        }

        config
    }
}
