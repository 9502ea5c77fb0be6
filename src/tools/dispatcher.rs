//! Dispatch of tool calls: resolve, validate, invoke, convert the outcome.
//!
//! Each dispatch is independent: the dispatcher holds no mutable state
//! between invocations, so any number of calls may run concurrently, bounded
//! only by the configured concurrency ceiling. A per-call timeout keeps a
//! wedged handler from stalling its session.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

use crate::core::config::LimitsConfig;

use super::error::ToolError;
use super::handler::Arguments;
use super::registry::ToolRegistry;

/// One inbound invocation request.
///
/// `id` is the client's correlation token: it is opaque to the server and is
/// echoed back verbatim on the matching result or error frame.
#[derive(Debug, Clone, PartialEq)]
pub struct CallRequest {
    /// Correlation token pairing this request with its eventual result.
    pub id: String,

    /// Name of the tool to invoke.
    pub tool: String,

    /// Call arguments, keyed by parameter name.
    pub arguments: Arguments,
}

/// The wire-level classification of a failed call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// No tool with the requested name is registered.
    UnknownTool,
    /// The arguments do not match the tool's input schema.
    InvalidArguments,
    /// The handler's underlying operation failed.
    HandlerError,
    /// The handler exceeded its execution budget.
    Timeout,
}

/// A failure descriptor delivered to the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Failure {
    /// Failure classification.
    pub kind: FailureKind,

    /// Human-readable message, sanitized for client consumption.
    pub message: String,
}

impl From<ToolError> for Failure {
    fn from(err: ToolError) -> Self {
        let kind = match err {
            ToolError::UnknownTool(_) => FailureKind::UnknownTool,
            ToolError::InvalidArguments(_) => FailureKind::InvalidArguments,
            ToolError::Timeout => FailureKind::Timeout,
            ToolError::ExecutionFailed(_) | ToolError::Duplicate(_) => FailureKind::HandlerError,
        };
        Self {
            kind,
            message: err.to_string(),
        }
    }
}

/// The outcome of one dispatch, consumed by the transport layer.
#[derive(Debug, Clone, PartialEq)]
pub struct CallOutcome {
    /// The originating request's correlation token.
    pub id: String,

    /// Success payload or failure descriptor.
    pub result: Result<Value, Failure>,
}

impl CallOutcome {
    fn success(id: String, value: Value) -> Self {
        Self {
            id,
            result: Ok(value),
        }
    }

    fn failure(id: String, err: ToolError) -> Self {
        Self {
            id,
            result: Err(err.into()),
        }
    }
}

/// Dispatcher - validates and invokes tool handlers for call requests.
pub struct Dispatcher {
    registry: Arc<ToolRegistry>,
    call_timeout: std::time::Duration,
    permits: Arc<Semaphore>,
}

impl Dispatcher {
    /// Create a dispatcher over the given registry with the given limits.
    pub fn new(registry: Arc<ToolRegistry>, limits: &LimitsConfig) -> Self {
        Self {
            registry,
            call_timeout: limits.call_timeout(),
            permits: Arc::new(Semaphore::new(limits.max_concurrent_calls)),
        }
    }

    /// Dispatch one call request.
    ///
    /// Every failure mode is recovered into a [`CallOutcome`]; nothing here
    /// terminates the session. The handler is only invoked once the request
    /// has resolved to a registered tool and its arguments have validated.
    pub async fn dispatch(&self, request: CallRequest) -> CallOutcome {
        let CallRequest {
            id,
            tool,
            arguments,
        } = request;

        let descriptor = match self.registry.lookup(&tool) {
            Ok(descriptor) => descriptor,
            Err(err) => {
                debug!(tool = %tool, "call to unknown tool");
                return CallOutcome::failure(id, err);
            }
        };

        let arguments = match descriptor.schema().validate(&arguments) {
            Ok(canonical) => canonical,
            Err(err) => {
                debug!(tool = %tool, %err, "argument validation failed");
                return CallOutcome::failure(id, err);
            }
        };

        // The timeout covers both the wait for a permit and the handler
        // itself, so a saturated server reports Timeout instead of queueing
        // a call indefinitely.
        let handler = descriptor.handler().clone();
        let invocation = async {
            let _permit = self
                .permits
                .acquire()
                .await
                .map_err(|_| ToolError::execution_failed("dispatcher is shutting down"))?;
            handler.call(arguments).await
        };

        match tokio::time::timeout(self.call_timeout, invocation).await {
            Ok(Ok(value)) => CallOutcome::success(id, value),
            Ok(Err(err)) => {
                warn!(tool = %tool, %err, "tool handler failed");
                CallOutcome::failure(id, err)
            }
            Err(_elapsed) => {
                warn!(tool = %tool, timeout = ?self.call_timeout, "tool call timed out");
                CallOutcome::failure(id, ToolError::Timeout)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::handler::{ToolDescriptor, ToolHandler};
    use crate::tools::schema::{InputSchema, ParamType};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Records invocations and echoes its arguments back.
    struct EchoTool {
        invocations: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl ToolHandler for EchoTool {
        async fn call(&self, arguments: Arguments) -> Result<Value, ToolError> {
            self.invocations.fetch_add(1, Ordering::SeqCst);
            Ok(Value::Object(arguments))
        }
    }

    /// Sleeps for a configurable delay before answering.
    struct SleepyTool {
        delay: Duration,
    }

    #[async_trait::async_trait]
    impl ToolHandler for SleepyTool {
        async fn call(&self, _arguments: Arguments) -> Result<Value, ToolError> {
            tokio::time::sleep(self.delay).await;
            Ok(json!({"slept_ms": self.delay.as_millis() as u64}))
        }
    }

    /// Always fails.
    struct BrokenTool;

    #[async_trait::async_trait]
    impl ToolHandler for BrokenTool {
        async fn call(&self, _arguments: Arguments) -> Result<Value, ToolError> {
            Err(ToolError::execution_failed("upstream API returned 503"))
        }
    }

    fn limits(timeout_secs: u64, ceiling: usize) -> LimitsConfig {
        LimitsConfig {
            call_timeout_secs: timeout_secs,
            max_concurrent_calls: ceiling,
            shutdown_grace_secs: 1,
        }
    }

    fn echo_schema() -> InputSchema {
        InputSchema::builder()
            .required("text", ParamType::String, "Text to echo")
            .build()
    }

    fn request(id: &str, tool: &str, arguments: Value) -> CallRequest {
        let Value::Object(arguments) = arguments else {
            panic!("arguments must be an object");
        };
        CallRequest {
            id: id.to_string(),
            tool: tool.to_string(),
            arguments,
        }
    }

    fn echo_dispatcher() -> (Dispatcher, Arc<EchoTool>) {
        let handler = Arc::new(EchoTool {
            invocations: AtomicUsize::new(0),
        });
        let mut registry = ToolRegistry::new();
        registry
            .register(ToolDescriptor::new(
                "echo",
                "echoes its arguments",
                echo_schema(),
                handler.clone(),
            ))
            .unwrap();
        (Dispatcher::new(Arc::new(registry), &limits(5, 8)), handler)
    }

    #[tokio::test]
    async fn test_unknown_tool_never_invokes_handler() {
        let (dispatcher, handler) = echo_dispatcher();
        let outcome = dispatcher
            .dispatch(request("r1", "nope", json!({"text": "hi"})))
            .await;
        let failure = outcome.result.unwrap_err();
        assert_eq!(failure.kind, FailureKind::UnknownTool);
        assert_eq!(handler.invocations.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_invalid_arguments_never_invokes_handler() {
        let (dispatcher, handler) = echo_dispatcher();
        let outcome = dispatcher.dispatch(request("r1", "echo", json!({}))).await;
        let failure = outcome.result.unwrap_err();
        assert_eq!(failure.kind, FailureKind::InvalidArguments);
        assert!(failure.message.contains("'text'"));
        assert_eq!(handler.invocations.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_success_carries_correlation_token() {
        let (dispatcher, _) = echo_dispatcher();
        let outcome = dispatcher
            .dispatch(request("r42", "echo", json!({"text": "hi"})))
            .await;
        assert_eq!(outcome.id, "r42");
        assert_eq!(outcome.result.unwrap(), json!({"text": "hi"}));
    }

    #[tokio::test]
    async fn test_fresh_token_reinvokes_handler() {
        let (dispatcher, handler) = echo_dispatcher();
        for id in ["a", "b"] {
            let outcome = dispatcher
                .dispatch(request(id, "echo", json!({"text": "same"})))
                .await;
            assert!(outcome.result.is_ok());
        }
        assert_eq!(handler.invocations.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_handler_failure_recovered_as_handler_error() {
        let mut registry = ToolRegistry::new();
        registry
            .register(ToolDescriptor::new(
                "broken",
                "always fails",
                InputSchema::default(),
                Arc::new(BrokenTool),
            ))
            .unwrap();
        let dispatcher = Dispatcher::new(Arc::new(registry), &limits(5, 8));

        let outcome = dispatcher.dispatch(request("r1", "broken", json!({}))).await;
        let failure = outcome.result.unwrap_err();
        assert_eq!(failure.kind, FailureKind::HandlerError);
        assert!(failure.message.contains("503"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_and_session_stays_usable() {
        let mut registry = ToolRegistry::new();
        registry
            .register(ToolDescriptor::new(
                "stuck",
                "never finishes in time",
                InputSchema::default(),
                Arc::new(SleepyTool {
                    delay: Duration::from_secs(3600),
                }),
            ))
            .unwrap();
        registry
            .register(ToolDescriptor::new(
                "quick",
                "finishes immediately",
                InputSchema::default(),
                Arc::new(SleepyTool {
                    delay: Duration::from_millis(1),
                }),
            ))
            .unwrap();
        let dispatcher = Dispatcher::new(Arc::new(registry), &limits(1, 8));

        let started = tokio::time::Instant::now();
        let outcome = dispatcher.dispatch(request("r1", "stuck", json!({}))).await;
        assert_eq!(outcome.result.unwrap_err().kind, FailureKind::Timeout);
        assert!(started.elapsed() < Duration::from_secs(2));

        // The abandoned invocation must not block later calls.
        let outcome = dispatcher.dispatch(request("r2", "quick", json!({}))).await;
        assert!(outcome.result.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_dispatch_runs_in_parallel() {
        let mut registry = ToolRegistry::new();
        for (name, ms) in [("d100", 100u64), ("d200", 200), ("d300", 300)] {
            registry
                .register(ToolDescriptor::new(
                    name,
                    "sleeps",
                    InputSchema::default(),
                    Arc::new(SleepyTool {
                        delay: Duration::from_millis(ms),
                    }),
                ))
                .unwrap();
        }
        let dispatcher = Dispatcher::new(Arc::new(registry), &limits(5, 8));

        let started = tokio::time::Instant::now();
        let outcomes = futures::future::join_all([
            dispatcher.dispatch(request("t100", "d100", json!({}))),
            dispatcher.dispatch(request("t200", "d200", json!({}))),
            dispatcher.dispatch(request("t300", "d300", json!({}))),
        ])
        .await;

        // Wall clock approximates the slowest handler, not the sum.
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(300));
        assert!(elapsed < Duration::from_millis(400));

        for (outcome, (id, ms)) in outcomes
            .iter()
            .zip([("t100", 100u64), ("t200", 200), ("t300", 300)])
        {
            assert_eq!(outcome.id, id);
            assert_eq!(
                outcome.result.as_ref().unwrap(),
                &json!({"slept_ms": ms})
            );
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrency_ceiling_serializes_excess_calls() {
        let mut registry = ToolRegistry::new();
        registry
            .register(ToolDescriptor::new(
                "slow",
                "sleeps",
                InputSchema::default(),
                Arc::new(SleepyTool {
                    delay: Duration::from_millis(100),
                }),
            ))
            .unwrap();
        let dispatcher = Dispatcher::new(Arc::new(registry), &limits(5, 1));

        let started = tokio::time::Instant::now();
        futures::future::join_all([
            dispatcher.dispatch(request("a", "slow", json!({}))),
            dispatcher.dispatch(request("b", "slow", json!({}))),
        ])
        .await;
        assert!(started.elapsed() >= Duration::from_millis(200));
    }

    #[test]
    fn test_failure_kind_wire_names() {
        assert_eq!(
            serde_json::to_value(FailureKind::UnknownTool).unwrap(),
            json!("unknown_tool")
        );
        assert_eq!(
            serde_json::to_value(FailureKind::InvalidArguments).unwrap(),
            json!("invalid_arguments")
        );
        assert_eq!(
            serde_json::to_value(FailureKind::HandlerError).unwrap(),
            json!("handler_error")
        );
        assert_eq!(
            serde_json::to_value(FailureKind::Timeout).unwrap(),
            json!("timeout")
        );
    }
}
