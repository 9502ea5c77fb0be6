//! The tool handler trait and tool descriptors.

use std::sync::Arc;

use serde_json::Value;

use super::error::ToolError;
use super::schema::InputSchema;

/// Validated call arguments, as produced by [`InputSchema::validate`].
pub type Arguments = serde_json::Map<String, Value>;

/// Trait implemented by every tool body.
///
/// The dispatcher validates arguments against the tool's schema before
/// calling, so implementations can assume well-typed input. Anything the
/// handler's underlying operation reports as a failure should come back as
/// [`ToolError::ExecutionFailed`] with a message safe to show the client.
#[async_trait::async_trait]
pub trait ToolHandler: Send + Sync {
    /// Execute the tool with validated arguments.
    async fn call(&self, arguments: Arguments) -> Result<Value, ToolError>;
}

/// A registered tool: name, documented input schema, and handler.
///
/// Descriptors are created when a server binary registers its tools at
/// startup and are immutable thereafter.
#[derive(Clone)]
pub struct ToolDescriptor {
    name: &'static str,
    description: &'static str,
    schema: InputSchema,
    handler: Arc<dyn ToolHandler>,
}

impl ToolDescriptor {
    /// Create a descriptor.
    pub fn new(
        name: &'static str,
        description: &'static str,
        schema: InputSchema,
        handler: Arc<dyn ToolHandler>,
    ) -> Self {
        Self {
            name,
            description,
            schema,
            handler,
        }
    }

    /// The tool's unique name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The tool's description shown to clients.
    pub fn description(&self) -> &'static str {
        self.description
    }

    /// The tool's input schema.
    pub fn schema(&self) -> &InputSchema {
        &self.schema
    }

    /// The tool's handler.
    pub fn handler(&self) -> &Arc<dyn ToolHandler> {
        &self.handler
    }
}

impl std::fmt::Debug for ToolDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolDescriptor")
            .field("name", &self.name)
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}
