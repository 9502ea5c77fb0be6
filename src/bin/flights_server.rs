//! Flight Search Server Entry Point
//!
//! Serves the `search_flights` tool over SSE, backed by the SerpAPI Google
//! Flights engine. `SERPAPI_API_KEY` is required for calls to succeed.

use anyhow::Result;
use tracing::info;

use toolcast::core::transport::SseTransport;
use toolcast::core::{Config, ToolServer, logging};
use toolcast::tools::ToolRegistry;
use toolcast::tools::definitions::FlightSearchTool;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration from environment
    let config = Config::from_env("flights-server", 8001);

    // Initialize logging
    logging::init(&config.logging);

    info!("Starting {} v{}", config.server.name, config.server.version);

    // Register this instance's tool set
    let mut registry = ToolRegistry::new();
    registry.register(FlightSearchTool::descriptor(&config.credentials))?;

    let server = ToolServer::new(config.clone(), registry);

    info!("Server initialized");

    // Run the SSE transport until shutdown
    let transport = SseTransport::new(config.transport);
    transport.run(server).await?;

    info!("Server shutting down");

    Ok(())
}
