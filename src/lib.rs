pub mod config;
pub mod error;
pub mod mcp;

pub use config::{McpServerConfig, McpServerOptions, MountConfig, ServerInfo};
pub use error::McpError;
pub use mcp::{Composition, McpModule, McpServer, ToolResult};
