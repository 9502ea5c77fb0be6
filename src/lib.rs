//! Toolcast Server Library
//!
//! This crate provides the runtime shared by the toolcast servers: long-lived
//! processes that advertise a fixed set of schema-typed tools to a remote
//! client over Server-Sent Events, dispatch incoming calls to the matching
//! handler, and stream back correlation-tagged results.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - **core**: Shared infrastructure including configuration, error handling,
//!   the server handle, and the SSE transport layer
//! - **tools**: The tool runtime — schema validation, the registry, the
//!   dispatcher, and the individual tool definitions
//!
//! # Example
//!
//! ```rust,no_run
//! use toolcast::core::{Config, ToolServer};
//! use toolcast::core::transport::SseTransport;
//! use toolcast::tools::ToolRegistry;
//! use toolcast::tools::definitions::DiceRollTool;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env("dice-server", 8002);
//!     let mut registry = ToolRegistry::new();
//!     registry.register(DiceRollTool::descriptor())?;
//!     let server = ToolServer::new(config.clone(), registry);
//!     SseTransport::new(config.transport).run(server).await?;
//!     Ok(())
//! }
//! ```

pub mod core;
pub mod tools;

// Re-export commonly used types for convenience
pub use core::{Config, Error, Result, ToolServer};
