//! SSE transport implementation.
//!
//! Serves the persistent event stream and the inbound message endpoint.
//! Each `GET` on the stream path opens a session whose first events are the
//! message-post endpoint and the capability handshake; call results are
//! pushed onto the same stream as correlation-tagged events.

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    response::sse::{Event, KeepAlive, Sse},
    routing::{get, post},
};
use futures::{Stream, StreamExt, stream};
use serde::Deserialize;
use tokio_stream::wrappers::ReceiverStream;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::config::SseConfig;
use super::error::{TransportError, TransportResult};
use super::frame::{ClientFrame, ServerFrame};
use super::session::SessionManager;
use crate::core::server::ToolServer;
use crate::tools::CallRequest;

/// SSE transport handler.
pub struct SseTransport {
    config: SseConfig,
}

/// Application state shared across HTTP handlers.
#[derive(Clone)]
struct AppState {
    /// The server instance handling dispatch.
    server: ToolServer,
    /// All live sessions of this process.
    sessions: Arc<SessionManager>,
    /// Where clients post inbound frames.
    message_path: String,
    /// Keep-alive interval for idle streams.
    keep_alive: Duration,
}

#[derive(Debug, Deserialize)]
struct SessionQuery {
    session_id: Uuid,
}

/// Closes the session when the client drops the SSE stream.
struct DisconnectGuard {
    id: Uuid,
    sessions: Arc<SessionManager>,
}

impl Drop for DisconnectGuard {
    fn drop(&mut self) {
        if self.sessions.close(&self.id) {
            info!(session = %self.id, "client disconnected; session closed");
        }
    }
}

impl SseTransport {
    /// Create a new SSE transport with the given config.
    pub fn new(config: SseConfig) -> Self {
        Self { config }
    }

    /// Get the bind address.
    pub fn address(&self) -> String {
        self.config.address()
    }

    /// Run the SSE transport.
    ///
    /// This method blocks until a shutdown signal arrives, then drains
    /// in-flight calls within the configured grace period before returning.
    pub async fn run(self, server: ToolServer) -> TransportResult<()> {
        let addr = self.address();
        let sessions = Arc::new(SessionManager::new());
        let grace = server.config().limits.shutdown_grace();

        let state = AppState {
            server,
            sessions: sessions.clone(),
            message_path: self.config.message_path.clone(),
            keep_alive: Duration::from_secs(self.config.keep_alive_secs),
        };

        // Build router
        let mut app = Router::new()
            .route(&self.config.sse_path, get(sse_handler))
            .route(&self.config.message_path, post(message_handler))
            .route("/health", get(health_check))
            .route("/", get(root_handler))
            .with_state(state)
            .layer(TraceLayer::new_for_http());

        // Add CORS if enabled
        if self.config.enable_cors {
            let cors = CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any);
            app = app.layer(cors);
        }

        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| TransportError::bind(&addr, e))?;

        info!("Ready - listening on {} (tool stream over SSE)", addr);
        info!("  → Stream:   GET {}", self.config.sse_path);
        info!("  → Messages: POST {}", self.config.message_path);
        info!("  → Health:   GET /health");

        let shutdown = async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "failed to listen for shutdown signal");
                return;
            }
            info!("Shutdown signal received; draining in-flight calls");
            sessions.drain(grace).await;
        };

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| TransportError::http(e.to_string()))?;

        Ok(())
    }
}

/// Root handler - provides API info.
async fn root_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "name": state.server.name(),
        "version": state.server.version(),
        "transport": "SSE",
        "endpoints": {
            "stream": "/sse",
            "messages": state.message_path,
            "health": "/health"
        },
        "documentation": "Open the stream endpoint, then POST call frames to the advertised message endpoint"
    }))
}

/// Health check endpoint.
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// Open a session and stream its outbound frames.
async fn sse_handler(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let (session, rx) = state.sessions.open();

    let endpoint = ServerFrame::Endpoint {
        url: format!("{}?session_id={}", state.message_path, session.id()),
    };
    let handshake = state.server.handshake();

    let guard = DisconnectGuard {
        id: session.id(),
        sessions: state.sessions.clone(),
    };

    let events = stream::iter([endpoint, handshake])
        .chain(ReceiverStream::new(rx))
        .map(move |frame| {
            let _keep = &guard;
            Ok::<_, Infallible>(frame.to_event())
        });

    Sse::new(events).keep_alive(KeepAlive::new().interval(state.keep_alive))
}

/// Handle one inbound client frame.
#[instrument(skip_all, fields(session = %query.session_id))]
async fn message_handler(
    State(state): State<AppState>,
    Query(query): Query<SessionQuery>,
    body: String,
) -> (StatusCode, &'static str) {
    let Some(session) = state.sessions.get(&query.session_id) else {
        return (StatusCode::NOT_FOUND, "unknown session");
    };

    // A corrupted stream cannot be partially recovered; the session dies.
    let frame: ClientFrame = match serde_json::from_str(&body) {
        Ok(frame) => frame,
        Err(e) => {
            warn!(error = %e, "malformed inbound frame; closing session");
            state.sessions.close(&session.id());
            return (StatusCode::BAD_REQUEST, "protocol error: malformed frame");
        }
    };

    match frame {
        ClientFrame::Initialized => match session.mark_ready() {
            Ok(()) => {
                debug!("handshake acknowledged");
                (StatusCode::ACCEPTED, "ok")
            }
            Err(_) => (StatusCode::NOT_FOUND, "session closed"),
        },
        ClientFrame::Call {
            id,
            tool,
            arguments,
        } => {
            if !session.is_ready() {
                warn!("call before handshake acknowledgement; closing session");
                state.sessions.close(&session.id());
                return (
                    StatusCode::BAD_REQUEST,
                    "protocol error: call before initialized",
                );
            }

            let request = CallRequest {
                id,
                tool,
                arguments,
            };
            let server = state.server.clone();
            let responder = session.clone();
            session.spawn(async move {
                let outcome = server.dispatch(request).await;
                if responder.send(ServerFrame::from_outcome(outcome)).await.is_err() {
                    debug!(session = %responder.id(), "session closed before result delivery");
                }
            });
            (StatusCode::ACCEPTED, "accepted")
        }
    }
}
