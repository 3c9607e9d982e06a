//! MCP server multiplexing core
//!
//! Routes each inbound connection and each follow-up message to the correct
//! server instance and the correct live session behind one HTTP listener.
//!
//! # Architecture
//!
//! - [`McpServerRegistry`] - named server instances, idempotent registration
//! - [`TransportRegistry`] - two-level index (server id, session id) to live transport
//! - [`mcp_sse_handler`] and [`mcp_message_handler`] - the two HTTP operations
//!   driving both registries
//! - [`McpModule`] - composition modes for obtaining a wired registry pair
//! - [`McpServer`] / [`SseTransport`] - the protocol endpoint and the duplex
//!   channel the registries hand out
//!
//! # Example
//!
//! ```rust,no_run
//! use mcpmux::config::{McpServerConfig, MountConfig};
//! use mcpmux::mcp::{Composition, McpModule};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let module = McpModule::new(
//!     Composition::Singleton(MountConfig::new("/mcp")),
//!     vec![McpServerConfig::new("calculator", "calculator-server", "1.0.0")],
//! )
//! .await?;
//!
//! let app: axum::Router = module.router();
//! # Ok(())
//! # }
//! ```

pub mod handlers;
pub mod module;
pub mod server;
pub mod server_registry;
pub mod sse_transport;
pub mod transport_registry;

pub use handlers::{mcp_message_handler, mcp_sse_handler, McpState};
pub use module::{Composition, McpModule};
pub use server::{McpServer, ToolArguments, ToolContent, ToolResult};
pub use server_registry::{McpServerRegistry, RegistryError, SharedServerRegistry};
pub use sse_transport::{SseTransport, TransportError};
pub use transport_registry::{SharedTransportRegistry, TransportRegistry};
