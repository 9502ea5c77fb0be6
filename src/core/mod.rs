//! Core module containing shared infrastructure components.
//!
//! This module provides the foundational building blocks for the toolcast
//! servers, including error handling, configuration, logging setup, the
//! server handle, and the SSE transport layer.

pub mod config;
pub mod error;
pub mod logging;
pub mod server;
pub mod transport;

pub use config::Config;
pub use error::{Error, Result};
pub use server::ToolServer;
pub use transport::{SseConfig, SseTransport};
