//! Dice Server Entry Point
//!
//! Serves the `roll_dice` tool over SSE. Needs no external credentials.

use anyhow::Result;
use tracing::info;

use toolcast::core::transport::SseTransport;
use toolcast::core::{Config, ToolServer, logging};
use toolcast::tools::ToolRegistry;
use toolcast::tools::definitions::DiceRollTool;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration from environment
    let config = Config::from_env("dice-server", 8002);

    // Initialize logging
    logging::init(&config.logging);

    info!("Starting {} v{}", config.server.name, config.server.version);

    // Register this instance's tool set
    let mut registry = ToolRegistry::new();
    registry.register(DiceRollTool::descriptor())?;

    let server = ToolServer::new(config.clone(), registry);

    info!("Server initialized");

    // Run the SSE transport until shutdown
    let transport = SseTransport::new(config.transport);
    transport.run(server).await?;

    info!("Server shutting down");

    Ok(())
}
