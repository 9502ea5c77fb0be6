//! Transport configuration types.

use serde::{Deserialize, Serialize};

/// SSE transport configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SseConfig {
    /// Host address to bind to.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port number to listen on.
    pub port: u16,

    /// Path of the SSE stream endpoint.
    #[serde(default = "default_sse_path")]
    pub sse_path: String,

    /// Path of the inbound message endpoint.
    #[serde(default = "default_message_path")]
    pub message_path: String,

    /// Keep-alive interval for idle SSE streams, in seconds.
    #[serde(default = "default_keep_alive_secs")]
    pub keep_alive_secs: u64,

    /// Enable CORS for browser clients.
    #[serde(default = "default_cors")]
    pub enable_cors: bool,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_sse_path() -> String {
    "/sse".to_string()
}

fn default_message_path() -> String {
    "/messages".to_string()
}

fn default_keep_alive_secs() -> u64 {
    15
}

fn default_cors() -> bool {
    true
}

impl SseConfig {
    /// Create a configuration with defaults and the given port.
    pub fn with_port(port: u16) -> Self {
        Self {
            host: default_host(),
            port,
            sse_path: default_sse_path(),
            message_path: default_message_path(),
            keep_alive_secs: default_keep_alive_secs(),
            enable_cors: default_cors(),
        }
    }

    /// Load transport config from environment variables.
    pub fn from_env(default_port: u16) -> Self {
        let port = std::env::var("TOOLCAST_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(default_port);
        let host = std::env::var("TOOLCAST_HOST").unwrap_or_else(|_| default_host());
        let sse_path = std::env::var("TOOLCAST_SSE_PATH").unwrap_or_else(|_| default_sse_path());
        let message_path =
            std::env::var("TOOLCAST_MESSAGE_PATH").unwrap_or_else(|_| default_message_path());
        let keep_alive_secs = std::env::var("TOOLCAST_KEEP_ALIVE_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(default_keep_alive_secs);
        let enable_cors = std::env::var("TOOLCAST_CORS")
            .map(|v| v.to_lowercase() != "false" && v != "0")
            .unwrap_or(true);

        Self {
            host,
            port,
            sse_path,
            message_path,
            keep_alive_secs,
            enable_cors,
        }
    }

    /// The socket address to bind.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get a description of this transport for logging.
    pub fn description(&self) -> String {
        format!("SSE on {}{}", self.address(), self.sse_path)
    }
}
