//! Tool Registry - the fixed set of tools one server process exposes.
//!
//! The registry is populated by explicit `register` calls at startup and is
//! read-only for the remainder of the process lifetime. That absence of
//! runtime mutation is what lets sessions share it through an `Arc` without
//! locking.

use std::collections::HashMap;

use super::error::ToolError;
use super::handler::ToolDescriptor;

/// Tool registry - maps tool names to descriptors, preserving registration
/// order for handshake advertisement.
#[derive(Debug, Default)]
pub struct ToolRegistry {
    tools: Vec<ToolDescriptor>,
    index: HashMap<&'static str, usize>,
}

impl ToolRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool descriptor.
    ///
    /// Fails with [`ToolError::Duplicate`] if a tool with the same name is
    /// already registered.
    pub fn register(&mut self, descriptor: ToolDescriptor) -> Result<(), ToolError> {
        let name = descriptor.name();
        if self.index.contains_key(name) {
            return Err(ToolError::duplicate(name));
        }
        self.index.insert(name, self.tools.len());
        self.tools.push(descriptor);
        Ok(())
    }

    /// Look up a tool by name.
    pub fn lookup(&self, name: &str) -> Result<&ToolDescriptor, ToolError> {
        self.index
            .get(name)
            .map(|&i| &self.tools[i])
            .ok_or_else(|| ToolError::unknown_tool(name))
    }

    /// All registered descriptors, in registration order.
    pub fn list(&self) -> &[ToolDescriptor] {
        &self.tools
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
