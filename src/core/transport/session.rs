//! Session state and lifecycle.
//!
//! One [`Session`] represents one connected client: its outbound frame
//! channel, its handshake state machine, and its set of in-flight dispatch
//! tasks. Sessions are owned by the [`SessionManager`] and are never shared
//! across clients.
//!
//! State machine: `Handshaking → Ready → Closed`. Closing is idempotent and
//! aborts in-flight dispatches best-effort; results completing after close
//! are dropped, since the channel to the client is gone.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::error::TransportError;
use super::frame::ServerFrame;

/// Outbound frames buffered per session before backpressure applies.
const OUTBOUND_BUFFER: usize = 64;

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Connected; the handshake has been sent but not yet acknowledged.
    Handshaking,
    /// Handshake acknowledged; calls are accepted.
    Ready,
    /// Torn down; no frames can be sent or accepted.
    Closed,
}

struct Inner {
    phase: SessionPhase,
    outbound: Option<mpsc::Sender<ServerFrame>>,
    tasks: JoinSet<()>,
}

/// One client's server-side connection state.
pub struct Session {
    id: Uuid,
    inner: Mutex<Inner>,
}

impl Session {
    fn new() -> (Arc<Self>, mpsc::Receiver<ServerFrame>) {
        let (tx, rx) = mpsc::channel(OUTBOUND_BUFFER);
        let session = Arc::new(Self {
            id: Uuid::new_v4(),
            inner: Mutex::new(Inner {
                phase: SessionPhase::Handshaking,
                outbound: Some(tx),
                tasks: JoinSet::new(),
            }),
        });
        (session, rx)
    }

    // A poisoned lock only means a panic mid-update elsewhere; the session
    // state itself stays usable, so recover the guard instead of propagating.
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// The session's unique identifier.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The session's current lifecycle phase.
    pub fn phase(&self) -> SessionPhase {
        self.lock().phase
    }

    /// Whether the session has completed its handshake.
    pub fn is_ready(&self) -> bool {
        self.phase() == SessionPhase::Ready
    }

    /// Record the client's handshake acknowledgement.
    ///
    /// Idempotent for an already-ready session; fails once closed.
    pub fn mark_ready(&self) -> Result<(), TransportError> {
        let mut inner = self.lock();
        match inner.phase {
            SessionPhase::Closed => Err(TransportError::SessionClosed),
            _ => {
                inner.phase = SessionPhase::Ready;
                Ok(())
            }
        }
    }

    /// Queue one frame for delivery on the session's SSE stream.
    pub async fn send(&self, frame: ServerFrame) -> Result<(), TransportError> {
        let sender = self.lock().outbound.clone();
        match sender {
            Some(tx) => tx
                .send(frame)
                .await
                .map_err(|_| TransportError::SessionClosed),
            None => Err(TransportError::SessionClosed),
        }
    }

    /// Run a dispatch task tied to this session's lifetime.
    ///
    /// The task is aborted if the session closes first. Spawning on a closed
    /// session drops the task.
    pub fn spawn(&self, task: impl Future<Output = ()> + Send + 'static) {
        let mut inner = self.lock();
        if inner.phase == SessionPhase::Closed {
            debug!(session = %self.id, "dropping dispatch for closed session");
            return;
        }
        // Reap finished entries so the set only holds live tasks.
        while inner.tasks.try_join_next().is_some() {}
        inner.tasks.spawn(task);
    }

    /// Number of dispatch tasks still running.
    pub fn in_flight(&self) -> usize {
        let mut inner = self.lock();
        while inner.tasks.try_join_next().is_some() {}
        inner.tasks.len()
    }

    /// Tear the session down: abort in-flight dispatches and drop the
    /// outbound channel so the SSE stream ends. Returns false if the
    /// session was already closed.
    fn close(&self) -> bool {
        let mut inner = self.lock();
        if inner.phase == SessionPhase::Closed {
            return false;
        }
        inner.phase = SessionPhase::Closed;
        inner.outbound = None;
        inner.tasks.abort_all();
        true
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("phase", &self.phase())
            .finish()
    }
}

/// Owns all live sessions of one server process.
#[derive(Debug, Default)]
pub struct SessionManager {
    sessions: Mutex<HashMap<Uuid, Arc<Session>>>,
}

impl SessionManager {
    /// Create an empty manager.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Uuid, Arc<Session>>> {
        self.sessions.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Open a new session, returning it together with the receiving end of
    /// its outbound frame channel.
    pub fn open(&self) -> (Arc<Session>, mpsc::Receiver<ServerFrame>) {
        let (session, rx) = Session::new();
        self.lock().insert(session.id(), session.clone());
        info!(session = %session.id(), "session opened");
        (session, rx)
    }

    /// Look up a live session.
    pub fn get(&self, id: &Uuid) -> Option<Arc<Session>> {
        self.lock().get(id).cloned()
    }

    /// Close and remove one session. Returns false if it was not live.
    pub fn close(&self, id: &Uuid) -> bool {
        match self.lock().remove(id) {
            Some(session) => session.close(),
            None => false,
        }
    }

    /// Close and remove every session.
    pub fn close_all(&self) {
        let sessions: Vec<_> = self.lock().drain().map(|(_, s)| s).collect();
        for session in sessions {
            session.close();
        }
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether any session is live.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Total in-flight dispatches across all sessions.
    pub fn in_flight(&self) -> usize {
        let sessions: Vec<_> = self.lock().values().cloned().collect();
        sessions.iter().map(|s| s.in_flight()).sum()
    }

    /// Drain in-flight dispatches for up to `grace`, then close everything.
    pub async fn drain(&self, grace: Duration) {
        let deadline = tokio::time::Instant::now() + grace;
        loop {
            let pending = self.in_flight();
            if pending == 0 {
                break;
            }
            if tokio::time::Instant::now() >= deadline {
                warn!(pending, "shutdown grace elapsed; aborting in-flight calls");
                break;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        self.close_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn result_frame(id: &str) -> ServerFrame {
        ServerFrame::Result {
            id: id.to_string(),
            result: json!(null),
        }
    }

    #[tokio::test]
    async fn test_open_session_starts_handshaking() {
        let manager = SessionManager::new();
        let (session, _rx) = manager.open();
        assert_eq!(session.phase(), SessionPhase::Handshaking);
        assert!(!session.is_ready());
        assert_eq!(manager.len(), 1);
        assert!(manager.get(&session.id()).is_some());
    }

    #[tokio::test]
    async fn test_mark_ready_is_idempotent() {
        let manager = SessionManager::new();
        let (session, _rx) = manager.open();
        session.mark_ready().unwrap();
        session.mark_ready().unwrap();
        assert!(session.is_ready());
    }

    #[tokio::test]
    async fn test_send_delivers_frame() {
        let manager = SessionManager::new();
        let (session, mut rx) = manager.open();
        session.send(result_frame("c1")).await.unwrap();
        let frame = rx.recv().await.unwrap();
        assert!(matches!(frame, ServerFrame::Result { id, .. } if id == "c1"));
    }

    #[tokio::test]
    async fn test_send_after_close_fails_and_stream_ends() {
        let manager = SessionManager::new();
        let (session, mut rx) = manager.open();
        assert!(manager.close(&session.id()));
        let err = session.send(result_frame("c1")).await.unwrap_err();
        assert!(matches!(err, TransportError::SessionClosed));
        assert!(rx.recv().await.is_none());
        assert!(manager.get(&session.id()).is_none());
    }

    #[tokio::test]
    async fn test_close_is_idempotent() {
        let manager = SessionManager::new();
        let (session, _rx) = manager.open();
        assert!(manager.close(&session.id()));
        assert!(!manager.close(&session.id()));
    }

    #[tokio::test]
    async fn test_mark_ready_after_close_fails() {
        let manager = SessionManager::new();
        let (session, _rx) = manager.open();
        manager.close(&session.id());
        assert!(matches!(
            session.mark_ready(),
            Err(TransportError::SessionClosed)
        ));
    }

    #[tokio::test]
    async fn test_close_aborts_in_flight_tasks() {
        let manager = SessionManager::new();
        let (session, _rx) = manager.open();
        session.spawn(async {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        });
        assert_eq!(session.in_flight(), 1);
        manager.close(&session.id());
        // Abort is asynchronous; give the runtime a moment to finish it.
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(session.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_spawn_on_closed_session_drops_task() {
        let manager = SessionManager::new();
        let (session, _rx) = manager.open();
        manager.close(&session.id());
        session.spawn(async {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        });
        assert_eq!(session.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_close_all_clears_every_session() {
        let manager = SessionManager::new();
        let (a, _rx_a) = manager.open();
        let (b, _rx_b) = manager.open();
        manager.close_all();
        assert!(manager.is_empty());
        assert_eq!(a.phase(), SessionPhase::Closed);
        assert_eq!(b.phase(), SessionPhase::Closed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drain_gives_up_after_grace() {
        let manager = SessionManager::new();
        let (session, _rx) = manager.open();
        session.spawn(async {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        });
        manager.drain(Duration::from_millis(200)).await;
        assert!(manager.is_empty());
        assert_eq!(session.phase(), SessionPhase::Closed);
    }
}
