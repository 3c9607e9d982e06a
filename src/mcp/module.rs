//! Module wiring and multi-tenancy composition modes
//!
//! An [`McpModule`] is a cheap-to-clone handle over one wired registry pair
//! (server registry + transport registry) plus the mount configuration it
//! serves under. There is no implicit process-wide global: the shared pair
//! is an explicit handle created once at startup and threaded by reference
//! through later configuration calls.
//!
//! [`Composition`] is the closed set of ways to obtain a handle:
//!
//! - `Scoped` — a fresh pair owned by one mount point
//! - `Singleton` — a fresh pair the application keeps as its shared handle
//! - `SingletonAugment` — add server configurations to an existing shared
//!   handle; passing `None` is a fatal configuration error

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::config::{McpServerConfig, MountConfig};
use crate::error::McpError;
use crate::mcp::handlers::{mcp_message_handler, mcp_sse_handler, McpState};
use crate::mcp::server::McpServer;
use crate::mcp::server_registry::{McpServerRegistry, SharedServerRegistry};
use crate::mcp::transport_registry::{SharedTransportRegistry, TransportRegistry};

/// How a mount obtains its registry pair. Selected once at startup.
pub enum Composition {
    /// Fresh registries owned by this mount alone.
    Scoped(MountConfig),
    /// Fresh registries the application keeps as its shared handle.
    Singleton(MountConfig),
    /// Reuse an already-created shared handle, adding server configurations
    /// to it. `None` means the shared pair was never created, which is a
    /// wiring bug surfaced as [`McpError::SharedPairMissing`].
    SingletonAugment(Option<McpModule>),
}

/// Handle over one wired registry pair and its mount configuration.
///
/// Clones share the same registries, so a handle can be threaded through
/// application setup and later augmented in place.
#[derive(Clone)]
pub struct McpModule {
    servers: SharedServerRegistry,
    transports: SharedTransportRegistry,
    config: Arc<MountConfig>,
}

impl std::fmt::Debug for McpModule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("McpModule")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl McpModule {
    /// Builds a module from a composition mode, registering the given
    /// servers into whichever pair the mode selects.
    pub async fn new(
        composition: Composition,
        server_configs: Vec<McpServerConfig>,
    ) -> Result<Self, McpError> {
        let module = match composition {
            Composition::Scoped(config) | Composition::Singleton(config) => Self {
                servers: Arc::new(RwLock::new(McpServerRegistry::new())),
                transports: Arc::new(RwLock::new(TransportRegistry::new())),
                config: Arc::new(config),
            },
            Composition::SingletonAugment(Some(shared)) => shared,
            Composition::SingletonAugment(None) => return Err(McpError::SharedPairMissing),
        };

        for server_config in server_configs {
            module.register_server(server_config).await;
        }

        Ok(module)
    }

    /// Registers one more server on this handle. Idempotent: an already
    /// registered id keeps its existing instance.
    pub async fn register_server(&self, config: McpServerConfig) -> Arc<McpServer> {
        self.servers.write().await.register_server(config)
    }

    pub async fn get_server(&self, server_id: &str) -> Option<Arc<McpServer>> {
        self.servers.read().await.get_server(server_id)
    }

    pub fn server_registry(&self) -> SharedServerRegistry {
        Arc::clone(&self.servers)
    }

    pub fn transport_registry(&self) -> SharedTransportRegistry {
        Arc::clone(&self.transports)
    }

    pub fn config(&self) -> &MountConfig {
        &self.config
    }

    /// Builds the axum router for this mount:
    /// `GET {base}/{server_id}/{sse}` and `POST {base}/{server_id}/{messages}`.
    pub fn router(&self) -> Router {
        let state = McpState {
            servers: Arc::clone(&self.servers),
            transports: Arc::clone(&self.transports),
            config: Arc::clone(&self.config),
        };

        let routes = Router::new()
            .route(
                &format!("/{{server_id}}/{}", self.config.sse_endpoint),
                get(mcp_sse_handler),
            )
            .route(
                &format!("/{{server_id}}/{}", self.config.messages_endpoint),
                post(mcp_message_handler),
            )
            .with_state(state);

        let base = self.config.base_path.trim_end_matches('/');
        if base.is_empty() {
            routes
        } else if base.starts_with('/') {
            Router::new().nest(base, routes)
        } else {
            Router::new().nest(&format!("/{base}"), routes)
        }
    }
}
