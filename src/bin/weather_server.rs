//! Weather Server Entry Point
//!
//! Serves the `get_weather_forecast` tool over SSE, backed by the CWA Open
//! Data API. Set `CWA_API_KEY` for the full dataset.

use anyhow::Result;
use tracing::info;

use toolcast::core::transport::SseTransport;
use toolcast::core::{Config, ToolServer, logging};
use toolcast::tools::ToolRegistry;
use toolcast::tools::definitions::WeatherForecastTool;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration from environment
    let config = Config::from_env("weather-server", 8000);

    // Initialize logging
    logging::init(&config.logging);

    info!("Starting {} v{}", config.server.name, config.server.version);

    // Register this instance's tool set
    let mut registry = ToolRegistry::new();
    registry.register(WeatherForecastTool::descriptor(&config.credentials))?;

    let server = ToolServer::new(config.clone(), registry);

    info!("Server initialized");

    // Run the SSE transport until shutdown
    let transport = SseTransport::new(config.transport);
    transport.run(server).await?;

    info!("Server shutting down");

    Ok(())
}
