//! SSE-backed transport session
//!
//! One [`SseTransport`] represents one live client connection to one server
//! instance. The transport owns the write half of the SSE stream: events
//! pushed into its channel are delivered to the client by the handler that
//! opened the stream. Session ids are generated fresh per connection and are
//! never reused.
//!
//! Lifecycle: created when the stream is opened, bound to a server at
//! connect time, active while messages are exchanged, closed when the client
//! drops the stream. There is no half-open state and no server-initiated
//! close.

use axum::response::sse::Event;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};
use uuid::Uuid;

use crate::mcp::server::McpServer;

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The client already dropped the stream; nothing can be delivered.
    #[error("SSE channel closed")]
    ChannelClosed,

    /// A message arrived before `connect` bound this transport to a server.
    #[error("Transport is not connected to a server")]
    NotConnected,

    #[error("Failed to serialize outbound message: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// One live duplex channel, identified by its generated session id.
///
/// Outbound direction is the SSE event channel; inbound direction is
/// [`SseTransport::handle_post_message`], fed by the message POST endpoint.
pub struct SseTransport {
    session_id: String,
    messages_endpoint: String,
    tx: mpsc::UnboundedSender<Event>,
    server: RwLock<Option<Arc<McpServer>>>,
}

impl SseTransport {
    /// Creates a transport with a freshly generated session id.
    ///
    /// `messages_endpoint` is the path suffix clients should POST follow-up
    /// messages to; it is echoed back in the `endpoint` event so the client
    /// can resolve it relative to the stream URL.
    pub fn new(messages_endpoint: &str, tx: mpsc::UnboundedSender<Event>) -> Self {
        Self {
            session_id: Uuid::new_v4().to_string(),
            messages_endpoint: messages_endpoint.to_string(),
            tx,
            server: RwLock::new(None),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Binds this transport to a server instance. Called once, at connect
    /// time, before the handshake starts.
    pub(crate) async fn bind(&self, server: Arc<McpServer>) {
        *self.server.write().await = Some(server);
    }

    /// Starts the session by emitting the MCP `endpoint` event, which tells
    /// the client where to POST messages and which session id to carry.
    pub(crate) fn start(&self) -> Result<(), TransportError> {
        let endpoint = format!("{}?sessionId={}", self.messages_endpoint, self.session_id);
        self.tx
            .send(Event::default().event("endpoint").data(endpoint))
            .map_err(|_| TransportError::ChannelClosed)
    }

    /// Forwards one posted JSON-RPC payload to the bound server and writes
    /// any response back onto the stream as a `message` event.
    ///
    /// Notifications produce no response and complete silently. The session
    /// may close mid-flight; in that case delivery fails with
    /// [`TransportError::ChannelClosed`].
    pub async fn handle_post_message(&self, body: Value) -> Result<(), TransportError> {
        let server = self
            .server
            .read()
            .await
            .clone()
            .ok_or(TransportError::NotConnected)?;

        if let Some(response) = server.handle_message(body).await {
            self.send_message(&response)?;
        }

        Ok(())
    }

    /// Pushes one JSON-RPC payload to the client as a `message` event.
    pub fn send_message(&self, payload: &Value) -> Result<(), TransportError> {
        let data = serde_json::to_string(payload)?;
        self.tx
            .send(Event::default().event("message").data(data))
            .map_err(|_| TransportError::ChannelClosed)
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    /// Resolves once the client side of the stream has been dropped. Drives
    /// registry cleanup: this is the only retirement path a session has.
    pub async fn closed(&self) {
        self.tx.closed().await
    }
}
