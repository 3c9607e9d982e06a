//! Mount and server configuration types.

use serde::{Deserialize, Serialize};

/// Default path suffix for the SSE stream endpoint.
pub const DEFAULT_SSE_ENDPOINT: &str = "sse";

/// Default path suffix for the message POST endpoint.
pub const DEFAULT_MESSAGES_ENDPOINT: &str = "messages";

/// Configuration for one HTTP mount point.
///
/// Routes are laid out as `{base_path}/{serverId}/{sse_endpoint}` for the
/// stream and `{base_path}/{serverId}/{messages_endpoint}` for posting
/// messages into an open session.
#[derive(Debug, Clone)]
pub struct MountConfig {
    pub base_path: String,
    pub sse_endpoint: String,
    pub messages_endpoint: String,
}

impl MountConfig {
    pub fn new(base_path: impl Into<String>) -> Self {
        Self {
            base_path: base_path.into(),
            sse_endpoint: DEFAULT_SSE_ENDPOINT.to_string(),
            messages_endpoint: DEFAULT_MESSAGES_ENDPOINT.to_string(),
        }
    }

    pub fn with_sse_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.sse_endpoint = endpoint.into();
        self
    }

    pub fn with_messages_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.messages_endpoint = endpoint.into();
        self
    }
}

impl Default for MountConfig {
    fn default() -> Self {
        Self::new("/")
    }
}

/// Name and version advertised by a server during the MCP handshake.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerInfo {
    pub name: String,
    pub version: String,
}

impl ServerInfo {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

/// Optional capability options for a server instance.
#[derive(Debug, Clone, Default)]
pub struct McpServerOptions {
    /// Free-form usage instructions returned from `initialize`.
    pub instructions: Option<String>,
}

/// Everything needed to register one server under a mount.
///
/// `server_id` is the caller-chosen identifier that appears in URLs and must
/// be unique within one registry.
#[derive(Debug, Clone)]
pub struct McpServerConfig {
    pub server_id: String,
    pub server_info: ServerInfo,
    pub options: McpServerOptions,
}

impl McpServerConfig {
    pub fn new(
        server_id: impl Into<String>,
        name: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            server_id: server_id.into(),
            server_info: ServerInfo::new(name, version),
            options: McpServerOptions::default(),
        }
    }

    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.options.instructions = Some(instructions.into());
        self
    }
}
