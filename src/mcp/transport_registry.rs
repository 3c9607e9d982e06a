//! Transport session registry
//!
//! Two-level index from server id to session id to live transport. The
//! nested shape keeps per-server session enumeration proportional to that
//! server's sessions rather than to all sessions in the process, which
//! matters once many server ids are multiplexed behind one listener.
//!
//! Invariants: a session only ever appears under the server id it was
//! created for; removing an absent session is a safe no-op; listing sessions
//! of an unknown server id yields an empty set.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::mcp::sse_transport::SseTransport;

/// Registry of live transport sessions, grouped by server id.
#[derive(Default)]
pub struct TransportRegistry {
    transports: HashMap<String, HashMap<String, Arc<SseTransport>>>,
}

pub type SharedTransportRegistry = Arc<RwLock<TransportRegistry>>;

impl TransportRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a transport under (server id, its generated session id),
    /// creating the per-server map on first use. Re-registering the same
    /// pair overwrites silently; session ids are freshly generated per
    /// connection so this does not happen in practice.
    pub fn register_transport(&mut self, server_id: &str, transport: Arc<SseTransport>) {
        let session_id = transport.session_id().to_string();
        self.transports
            .entry(server_id.to_string())
            .or_default()
            .insert(session_id, transport);
    }

    /// Removes a session if present; no-op otherwise. Drops the per-server
    /// map once its last session is gone.
    pub fn remove_transport(&mut self, server_id: &str, session_id: &str) {
        if let Some(sessions) = self.transports.get_mut(server_id) {
            sessions.remove(session_id);
            if sessions.is_empty() {
                self.transports.remove(server_id);
            }
        }
    }

    pub fn get_transport(&self, server_id: &str, session_id: &str) -> Option<Arc<SseTransport>> {
        self.transports
            .get(server_id)
            .and_then(|sessions| sessions.get(session_id))
            .map(Arc::clone)
    }

    /// Session ids currently live for a server; empty for unknown ids.
    pub fn active_session_ids(&self, server_id: &str) -> Vec<String> {
        self.transports
            .get(server_id)
            .map(|sessions| sessions.keys().cloned().collect())
            .unwrap_or_default()
    }
}
