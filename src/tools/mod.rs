//! Tools module - the tool runtime and the tool definitions.
//!
//! ## Architecture
//!
//! - `schema.rs` - input schemas and argument validation
//! - `handler.rs` - the `ToolHandler` trait and `ToolDescriptor`
//! - `registry.rs` - the fixed per-process tool set
//! - `dispatcher.rs` - call dispatch with timeout and concurrency ceiling
//! - `definitions/` - individual tool implementations (one file per tool)
//! - `error.rs` - tool-specific error types
//!
//! ## Adding a New Tool
//!
//! 1. Create a new file in `definitions/` (e.g., `my_tool.rs`)
//! 2. Implement `ToolHandler` and provide a `descriptor()` constructor
//! 3. Export it in `definitions/mod.rs`
//! 4. Register it in the server binary that should expose it

pub mod definitions;
mod dispatcher;
mod error;
mod handler;
mod registry;
mod schema;

pub use dispatcher::{CallOutcome, CallRequest, Dispatcher, Failure, FailureKind};
pub use error::ToolError;
pub use handler::{Arguments, ToolDescriptor, ToolHandler};
pub use registry::ToolRegistry;
pub use schema::{InputSchema, ParamSpec, ParamType};
