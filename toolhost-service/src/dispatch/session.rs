//! HTTP transport session tracking.
//!
//! The MCP Streamable HTTP transport pairs a `POST /mcp` request/response
//! exchange with a `GET /mcp` event stream sharing the same session id.
//! This is the same shape as a WebSocket connection manager — one
//! `DashMap` keyed by session id, each entry holding the sender half of
//! a channel the SSE handler drains — generalized from per-connection
//! auth state to a bare keep-alive channel, since MCP sessions carry no
//! per-connection identity of their own.

use dashmap::DashMap;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use uuid::Uuid;

pub type SessionEvent = String;

struct SessionState {
    tx: mpsc::UnboundedSender<SessionEvent>,
    cancellation: CancellationToken,
}

/// Tracks every open `GET /mcp` stream by session id.
pub struct SessionManager {
    sessions: DashMap<String, SessionState>,
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionManager {
    pub fn new() -> Self {
        Self { sessions: DashMap::new() }
    }

    /// Open a new session, returning its id and the receiving half of
    /// its event channel.
    pub fn create(&self) -> (String, mpsc::UnboundedReceiver<SessionEvent>, CancellationToken) {
        let id = Uuid::new_v4().to_string();
        let (tx, rx) = mpsc::unbounded_channel();
        let cancellation = CancellationToken::new();
        debug!(session_id = %id, "opening MCP session");
        self.sessions.insert(id.clone(), SessionState { tx, cancellation: cancellation.clone() });
        (id, rx, cancellation)
    }

    /// Push an event to a session's stream. Returns `false` if the
    /// session is unknown or its stream has already closed.
    pub fn send(&self, session_id: &str, event: SessionEvent) -> bool {
        match self.sessions.get(session_id) {
            Some(session) => session.tx.send(event).is_ok(),
            None => false,
        }
    }

    pub fn close(&self, session_id: &str) {
        if let Some((_, session)) = self.sessions.remove(session_id) {
            session.cancellation.cancel();
        }
        debug!(session_id = %session_id, "closed MCP session");
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_then_send_delivers_to_the_sessions_receiver() {
        let manager = SessionManager::new();
        let (id, mut rx, _cancellation) = manager.create();
        assert!(manager.send(&id, "hello".to_string()));
        assert_eq!(rx.try_recv().unwrap(), "hello");
    }

    #[test]
    fn send_to_unknown_session_returns_false() {
        let manager = SessionManager::new();
        assert!(!manager.send("unknown", "hello".to_string()));
    }

    #[test]
    fn close_removes_the_session_and_cancels_its_token() {
        let manager = SessionManager::new();
        let (id, _rx, cancellation) = manager.create();
        manager.close(&id);
        assert!(cancellation.is_cancelled());
        assert_eq!(manager.session_count(), 0);
    }
}
