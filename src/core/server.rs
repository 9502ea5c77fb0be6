//! Server handle tying configuration, registry, and dispatcher together.
//!
//! A [`ToolServer`] is created once per process, after the binary has
//! registered its tool set, and is then shared by every session. The
//! registry is frozen at that point; the transport layer only ever reads it.

use std::sync::Arc;

use super::config::Config;
use super::transport::{ServerFrame, ServerInfo, ToolInfo};
use crate::tools::{CallOutcome, CallRequest, Dispatcher, ToolRegistry};

/// The per-process server handle.
///
/// Cheap to clone; all state is behind `Arc`s.
#[derive(Clone)]
pub struct ToolServer {
    /// Server configuration.
    config: Arc<Config>,

    /// The fixed tool set this process exposes.
    registry: Arc<ToolRegistry>,

    /// Dispatcher handling call requests against the registry.
    dispatcher: Arc<Dispatcher>,
}

impl ToolServer {
    /// Create a new server with the given configuration and tool set.
    pub fn new(config: Config, registry: ToolRegistry) -> Self {
        let config = Arc::new(config);
        let registry = Arc::new(registry);
        let dispatcher = Arc::new(Dispatcher::new(registry.clone(), &config.limits));

        Self {
            config,
            registry,
            dispatcher,
        }
    }

    /// Get the server name.
    pub fn name(&self) -> &str {
        &self.config.server.name
    }

    /// Get the server version.
    pub fn version(&self) -> &str {
        &self.config.server.version
    }

    /// Get the server configuration.
    pub fn config(&self) -> &Arc<Config> {
        &self.config
    }

    /// Get the registered tool set.
    pub fn registry(&self) -> &Arc<ToolRegistry> {
        &self.registry
    }

    /// Dispatch one call request.
    pub async fn dispatch(&self, request: CallRequest) -> CallOutcome {
        self.dispatcher.dispatch(request).await
    }

    /// Build the capability handshake frame advertised to a new session:
    /// server identity plus every registered tool, in registration order.
    pub fn handshake(&self) -> ServerFrame {
        let tools = self
            .registry
            .list()
            .iter()
            .map(|descriptor| ToolInfo {
                name: descriptor.name().to_string(),
                description: descriptor.description().to_string(),
                input_schema: descriptor.schema().to_json(),
            })
            .collect();

        ServerFrame::Handshake {
            server: ServerInfo {
                name: self.name().to_string(),
                version: self.version().to_string(),
            },
            tools,
        }
    }
}
