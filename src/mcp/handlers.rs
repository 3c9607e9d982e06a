//! HTTP request handlers for MCP endpoints
//!
//! These two handlers drive both registries and wire them to a concrete
//! server instance over one HTTP request/response pair:
//!
//! - [`mcp_sse_handler`] opens a long-lived SSE stream, creating and
//!   registering a fresh transport session.
//! - [`mcp_message_handler`] routes a follow-up JSON-RPC message to the live
//!   session named by its `sessionId` query parameter.
//!
//! Session cleanup is arranged at open time: when the client drops the
//! stream, a background task removes the registry entry. That is the only
//! retirement path a session has; there is no timeout-based eviction.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    Json,
};
use futures::stream;
use serde::Deserialize;
use serde_json::Value;
use std::convert::Infallible;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::config::MountConfig;
use crate::error::McpError;
use crate::mcp::server_registry::SharedServerRegistry;
use crate::mcp::sse_transport::SseTransport;
use crate::mcp::transport_registry::SharedTransportRegistry;

/// Shared state handed to both handlers: the registry pair plus the mount
/// configuration the pair was wired under.
#[derive(Clone)]
pub struct McpState {
    pub servers: SharedServerRegistry,
    pub transports: SharedTransportRegistry,
    pub config: Arc<MountConfig>,
}

#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    #[serde(rename = "sessionId")]
    session_id: Option<String>,
}

/// Opens an SSE stream for one server.
///
/// # Route
///
/// `GET {base}/{server_id}/{sse}`
///
/// # Returns
///
/// * `200` with an open `text/event-stream`; the first event is the MCP
///   `endpoint` event carrying the freshly generated session id
/// * `404` when the server id is unknown (no transport is created)
pub async fn mcp_sse_handler(
    Path(server_id): Path<String>,
    State(state): State<McpState>,
) -> Result<Response, McpError> {
    if !state.servers.read().await.has_server(&server_id) {
        return Err(McpError::ServerNotFound(server_id));
    }

    let (tx, rx) = mpsc::unbounded_channel();
    let transport = Arc::new(SseTransport::new(&state.config.messages_endpoint, tx));
    let session_id = transport.session_id().to_string();

    state
        .transports
        .write()
        .await
        .register_transport(&server_id, Arc::clone(&transport));

    // The client dropping the stream is the session's only retirement path.
    {
        let transports = Arc::clone(&state.transports);
        let transport = Arc::clone(&transport);
        let server_id = server_id.clone();
        let session_id = session_id.clone();
        tokio::spawn(async move {
            transport.closed().await;
            transports
                .write()
                .await
                .remove_transport(&server_id, &session_id);
            tracing::info!(
                server_id = %server_id,
                session_id = %session_id,
                "MCP session disconnected"
            );
        });
    }

    // Connect after registration, so a message POST racing the handshake
    // still finds a registered transport.
    state
        .servers
        .read()
        .await
        .connect(&server_id, &transport)
        .await?;

    tracing::info!(
        server_id = %server_id,
        session_id = %session_id,
        "MCP session connected"
    );

    let events = stream::unfold(rx, |mut rx| async move {
        rx.recv()
            .await
            .map(|event| (Ok::<Event, Infallible>(event), rx))
    });

    Ok(Sse::new(events)
        .keep_alive(KeepAlive::default())
        .into_response())
}

/// Forwards one posted JSON-RPC message to a live session.
///
/// # Route
///
/// `POST {base}/{server_id}/{messages}?sessionId=...`
///
/// # Returns
///
/// * `202` once the session's handler has accepted the message; any
///   response travels back over the SSE stream
/// * `400` when the `sessionId` query parameter is missing or empty
/// * `404` when the server id is unknown, or the session never existed or
///   has already closed (the two are indistinguishable by design)
pub async fn mcp_message_handler(
    Path(server_id): Path<String>,
    Query(query): Query<MessageQuery>,
    State(state): State<McpState>,
    Json(body): Json<Value>,
) -> Result<Response, McpError> {
    if !state.servers.read().await.has_server(&server_id) {
        return Err(McpError::ServerNotFound(server_id));
    }

    let session_id = match query.session_id {
        Some(session_id) if !session_id.is_empty() => session_id,
        _ => return Err(McpError::MissingSessionId),
    };

    let transport = state
        .transports
        .read()
        .await
        .get_transport(&server_id, &session_id)
        .ok_or_else(|| McpError::SessionNotFound {
            server_id: server_id.clone(),
            session_id: session_id.clone(),
        })?;

    tracing::debug!(
        server_id = %server_id,
        session_id = %session_id,
        "Forwarding message to session"
    );

    transport.handle_post_message(body).await?;

    Ok((StatusCode::ACCEPTED, "Accepted").into_response())
}
