//! Server instance registry
//!
//! Maps caller-chosen server ids to running [`McpServer`] instances.
//! Registration is idempotent with first-write-wins semantics: registering
//! an id that already exists returns the existing instance unchanged and
//! ignores the new configuration. There is no unregister operation;
//! instances live for the process lifetime.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::config::McpServerConfig;
use crate::mcp::server::McpServer;
use crate::mcp::sse_transport::{SseTransport, TransportError};

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("MCP server '{0}' not found")]
    ServerNotFound(String),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Registry of named server instances.
///
/// Designed to be wrapped in `Arc<RwLock<>>` ([`SharedServerRegistry`]) and
/// shared across handlers; all operations on the registry itself are
/// synchronous map operations.
#[derive(Default)]
pub struct McpServerRegistry {
    servers: HashMap<String, Arc<McpServer>>,
    // Registration order, for `server_ids` snapshots.
    order: Vec<String>,
}

pub type SharedServerRegistry = Arc<RwLock<McpServerRegistry>>;

impl McpServerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a server, or returns the existing instance for an already
    /// registered id. The config of a second registration is ignored: the
    /// first registration wins.
    pub fn register_server(&mut self, config: McpServerConfig) -> Arc<McpServer> {
        if let Some(existing) = self.servers.get(&config.server_id) {
            tracing::debug!(
                server_id = %config.server_id,
                "MCP server already registered, keeping existing instance"
            );
            return Arc::clone(existing);
        }

        let server = Arc::new(McpServer::new(
            config.server_id.clone(),
            config.server_info,
            config.options,
        ));
        self.order.push(config.server_id.clone());
        self.servers.insert(config.server_id, Arc::clone(&server));

        tracing::info!(server_id = %server.server_id(), "MCP server registered");
        server
    }

    /// Pure lookup, no side effects.
    pub fn get_server(&self, server_id: &str) -> Option<Arc<McpServer>> {
        self.servers.get(server_id).map(Arc::clone)
    }

    pub fn has_server(&self, server_id: &str) -> bool {
        self.servers.contains_key(server_id)
    }

    /// Snapshot of registered ids in registration order.
    pub fn server_ids(&self) -> Vec<String> {
        self.order.clone()
    }

    /// Binds a transport to the named server and awaits the handshake start.
    ///
    /// The transport should already be registered in the transport registry,
    /// so that a message POST racing this call still finds the session.
    pub async fn connect(
        &self,
        server_id: &str,
        transport: &Arc<SseTransport>,
    ) -> Result<(), RegistryError> {
        let server = self
            .get_server(server_id)
            .ok_or_else(|| RegistryError::ServerNotFound(server_id.to_string()))?;

        server.connect(transport).await?;
        Ok(())
    }
}
