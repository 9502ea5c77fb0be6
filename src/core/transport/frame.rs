//! Wire frames exchanged over a session.
//!
//! Outbound frames ride the SSE stream, one frame per event, with the event
//! name mirroring the frame type. Inbound frames arrive as the JSON body of
//! a `POST` to the message endpoint. All frames are internally tagged with a
//! `type` field.

use axum::response::sse::Event;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::error;

use crate::tools::{Arguments, CallOutcome, Failure};

/// A frame sent by the client over the message endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientFrame {
    /// Acknowledges the handshake; transitions the session to Ready.
    Initialized,

    /// Invoke a tool. `id` is the correlation token echoed on the response.
    Call {
        id: String,
        tool: String,
        #[serde(default)]
        arguments: Arguments,
    },
}

/// Server identification advertised in the handshake.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerInfo {
    pub name: String,
    pub version: String,
}

/// One tool advertisement in the handshake.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolInfo {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

/// A frame streamed to the client over SSE.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerFrame {
    /// Where to POST inbound frames for this session.
    Endpoint { url: String },

    /// The capability advertisement: server identity plus the full tool
    /// list, in registration order.
    Handshake {
        server: ServerInfo,
        tools: Vec<ToolInfo>,
    },

    /// A successful call result, tagged with its correlation token.
    Result { id: String, result: Value },

    /// A failed call, tagged with its correlation token.
    Error { id: String, error: Failure },
}

impl ServerFrame {
    /// Build the result or error frame for a finished dispatch.
    pub fn from_outcome(outcome: CallOutcome) -> Self {
        match outcome.result {
            Ok(result) => Self::Result {
                id: outcome.id,
                result,
            },
            Err(error) => Self::Error {
                id: outcome.id,
                error,
            },
        }
    }

    /// The SSE event name for this frame.
    pub fn event_name(&self) -> &'static str {
        match self {
            Self::Endpoint { .. } => "endpoint",
            Self::Handshake { .. } => "handshake",
            Self::Result { .. } => "result",
            Self::Error { .. } => "error",
        }
    }

    /// Serialize this frame into an SSE event.
    pub fn to_event(&self) -> Event {
        let data = serde_json::to_string(self).unwrap_or_else(|e| {
            error!(error = %e, "failed to serialize outbound frame");
            "{}".to_string()
        });
        Event::default().event(self.event_name()).data(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::FailureKind;
    use serde_json::json;

    #[test]
    fn test_parse_call_frame() {
        let frame: ClientFrame = serde_json::from_str(
            r#"{"type": "call", "id": "c1", "tool": "roll_dice", "arguments": {"sides": 6}}"#,
        )
        .unwrap();
        let ClientFrame::Call {
            id,
            tool,
            arguments,
        } = frame
        else {
            panic!("expected a call frame");
        };
        assert_eq!(id, "c1");
        assert_eq!(tool, "roll_dice");
        assert_eq!(arguments.get("sides"), Some(&json!(6)));
    }

    #[test]
    fn test_parse_call_frame_without_arguments() {
        let frame: ClientFrame =
            serde_json::from_str(r#"{"type": "call", "id": "c2", "tool": "get_weather_forecast"}"#)
                .unwrap();
        assert!(matches!(frame, ClientFrame::Call { arguments, .. } if arguments.is_empty()));
    }

    #[test]
    fn test_parse_initialized_frame() {
        let frame: ClientFrame = serde_json::from_str(r#"{"type": "initialized"}"#).unwrap();
        assert_eq!(frame, ClientFrame::Initialized);
    }

    #[test]
    fn test_unknown_frame_type_rejected() {
        assert!(serde_json::from_str::<ClientFrame>(r#"{"type": "subscribe"}"#).is_err());
    }

    #[test]
    fn test_malformed_frame_rejected() {
        assert!(serde_json::from_str::<ClientFrame>(r#"{"type": "call"}"#).is_err());
        assert!(serde_json::from_str::<ClientFrame>("not json").is_err());
    }

    #[test]
    fn test_result_frame_serialization() {
        let frame = ServerFrame::Result {
            id: "c1".to_string(),
            result: json!({"rolls": [3]}),
        };
        assert_eq!(frame.event_name(), "result");
        let value = serde_json::to_value(&frame).unwrap();
        assert_eq!(value["type"], "result");
        assert_eq!(value["id"], "c1");
        assert_eq!(value["result"]["rolls"][0], 3);
    }

    #[test]
    fn test_error_frame_serialization() {
        let frame = ServerFrame::Error {
            id: "c9".to_string(),
            error: Failure {
                kind: FailureKind::Timeout,
                message: "Tool execution timed out".to_string(),
            },
        };
        assert_eq!(frame.event_name(), "error");
        let value = serde_json::to_value(&frame).unwrap();
        assert_eq!(value["id"], "c9");
        assert_eq!(value["error"]["kind"], "timeout");
    }

    #[test]
    fn test_handshake_preserves_tool_order() {
        let frame = ServerFrame::Handshake {
            server: ServerInfo {
                name: "dice-server".to_string(),
                version: "0.1.0".to_string(),
            },
            tools: vec![
                ToolInfo {
                    name: "zulu".to_string(),
                    description: String::new(),
                    input_schema: json!({}),
                },
                ToolInfo {
                    name: "alpha".to_string(),
                    description: String::new(),
                    input_schema: json!({}),
                },
            ],
        };
        let value = serde_json::to_value(&frame).unwrap();
        assert_eq!(value["tools"][0]["name"], "zulu");
        assert_eq!(value["tools"][1]["name"], "alpha");
    }
}
