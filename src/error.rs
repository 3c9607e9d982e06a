use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::mcp::server_registry::RegistryError;
use crate::mcp::sse_transport::TransportError;

/// Errors surfaced to HTTP callers and to module wiring.
///
/// Unknown identifiers map to `404`, caller mistakes to `400`, wiring bugs
/// and downstream failures to `500`. Response bodies are plain text naming
/// the missing identifier, so clients can tell which half of a
/// (serverId, sessionId) pair was wrong.
#[derive(Debug, Error)]
pub enum McpError {
    #[error("MCP server '{0}' not found")]
    ServerNotFound(String),

    #[error("Missing sessionId query parameter")]
    MissingSessionId,

    #[error("No active transport found for serverId: {server_id}, sessionId: {session_id}")]
    SessionNotFound {
        server_id: String,
        session_id: String,
    },

    /// Augmentation was requested before the shared registry pair existed.
    /// This is a startup wiring bug, not a runtime condition.
    #[error("Augmentation requires an existing shared registry pair; create a Singleton mount first")]
    SharedPairMissing,

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl McpError {
    fn status_code(&self) -> StatusCode {
        match self {
            McpError::ServerNotFound(_) | McpError::SessionNotFound { .. } => {
                StatusCode::NOT_FOUND
            }
            McpError::Registry(RegistryError::ServerNotFound(_)) => StatusCode::NOT_FOUND,
            McpError::MissingSessionId => StatusCode::BAD_REQUEST,
            McpError::SharedPairMissing | McpError::Registry(_) | McpError::Transport(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for McpError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.to_string();

        if status.is_server_error() {
            tracing::error!(status = %status, "{message}");
        } else {
            tracing::warn!(status = %status, "{message}");
        }

        (status, message).into_response()
    }
}
