//! Error types and handling for the toolcast servers.
//!
//! This module defines a unified error type that can represent errors from
//! the tool runtime and the transport layer, providing consistent error
//! handling across the entire application.

use thiserror::Error;

/// A specialized Result type for toolcast operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for the toolcast servers.
#[derive(Debug, Error)]
pub enum Error {
    /// Error originating from the tool runtime.
    #[error("Tool error: {0}")]
    Tool(#[from] crate::tools::ToolError),

    /// Error originating from the transport layer.
    #[error("Transport error: {0}")]
    Transport(#[from] crate::core::transport::TransportError),

    /// Configuration-related errors.
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors from network communication.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Internal server errors that should not occur under normal operation.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new internal error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}
