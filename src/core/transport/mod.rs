//! Transport layer for the toolcast servers.
//!
//! Clients connect over a persistent Server-Sent Events stream and post
//! call frames back over HTTP:
//!
//! - `GET /sse` opens a session and streams `endpoint`, `handshake`, and
//!   correlation-tagged `result`/`error` events to the client
//! - `POST /messages?session_id=...` carries one inbound client frame
//!
//! Frames are discrete, ordered events within one session; no ordering is
//! guaranteed across sessions. A malformed inbound frame is fatal to its
//! session, never to the process.

mod config;
mod error;
mod frame;
mod session;
mod sse;

pub use config::SseConfig;
pub use error::{TransportError, TransportResult};
pub use frame::{ClientFrame, ServerFrame, ServerInfo, ToolInfo};
pub use session::{Session, SessionManager, SessionPhase};
pub use sse::SseTransport;
