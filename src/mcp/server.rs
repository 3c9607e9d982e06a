//! MCP server instance
//!
//! An [`McpServer`] is one logical protocol endpoint: a name, a version,
//! capability options, and a set of registered tools. Instances are created
//! by the server registry and live for the process lifetime; they are handed
//! out as `Arc` references and never copied.
//!
//! The JSON-RPC dispatcher here is deliberately small: `initialize`, `ping`,
//! `tools/list` and `tools/call`, with notifications handled silently.
//! Responses travel back over the session's SSE stream, not the POST
//! response.

use futures::future::BoxFuture;
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::config::{McpServerOptions, ServerInfo};
use crate::mcp::sse_transport::{SseTransport, TransportError};

/// Protocol revision answered when the client does not request one.
pub const DEFAULT_PROTOCOL_VERSION: &str = "2024-11-05";

const INVALID_REQUEST: i64 = -32600;
const METHOD_NOT_FOUND: i64 = -32601;
const INVALID_PARAMS: i64 = -32602;
const INTERNAL_ERROR: i64 = -32603;

/// Arguments passed to a tool handler, as sent in `tools/call` params.
pub type ToolArguments = Option<Map<String, Value>>;

type ToolHandler = Arc<dyn Fn(ToolArguments) -> BoxFuture<'static, ToolResult> + Send + Sync>;

/// One block of tool output content.
#[derive(Debug, Clone, Serialize)]
pub struct ToolContent {
    #[serde(rename = "type")]
    pub kind: String,
    pub text: String,
}

/// Result of a tool invocation, in MCP `tools/call` shape.
///
/// Tool-level failures are expressed through `is_error` rather than JSON-RPC
/// errors, so clients can distinguish "the tool ran and complained" from
/// "the call never reached a tool".
#[derive(Debug, Clone, Serialize)]
pub struct ToolResult {
    pub content: Vec<ToolContent>,
    #[serde(rename = "isError")]
    pub is_error: bool,
}

impl ToolResult {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent {
                kind: "text".to_string(),
                text: text.into(),
            }],
            is_error: false,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent {
                kind: "text".to_string(),
                text: text.into(),
            }],
            is_error: true,
        }
    }
}

struct RegisteredTool {
    name: String,
    description: Option<String>,
    input_schema: Value,
    handler: ToolHandler,
}

/// One logical MCP protocol endpoint.
pub struct McpServer {
    server_id: String,
    info: ServerInfo,
    options: McpServerOptions,
    tools: RwLock<Vec<RegisteredTool>>,
}

impl McpServer {
    pub fn new(server_id: String, info: ServerInfo, options: McpServerOptions) -> Self {
        Self {
            server_id,
            info,
            options,
            tools: RwLock::new(Vec::new()),
        }
    }

    pub fn server_id(&self) -> &str {
        &self.server_id
    }

    pub fn info(&self) -> &ServerInfo {
        &self.info
    }

    /// Registers (or replaces) a tool on this instance.
    ///
    /// Callable at any time, including after sessions are open; the next
    /// `tools/list` reflects the change. `input_schema` is a JSON Schema
    /// object describing the handler's arguments.
    pub async fn register_tool<F, Fut>(
        &self,
        name: impl Into<String>,
        description: Option<&str>,
        input_schema: Value,
        handler: F,
    ) where
        F: Fn(ToolArguments) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ToolResult> + Send + 'static,
    {
        let name = name.into();
        let tool = RegisteredTool {
            name: name.clone(),
            description: description.map(str::to_owned),
            input_schema,
            handler: Arc::new(move |args| Box::pin(handler(args))),
        };

        let mut tools = self.tools.write().await;
        if let Some(existing) = tools.iter_mut().find(|t| t.name == name) {
            *existing = tool;
        } else {
            tools.push(tool);
        }

        tracing::debug!(server_id = %self.server_id, tool = %name, "Tool registered");
    }

    /// Binds a transport to this instance and starts the handshake.
    ///
    /// The transport must already be registered so that a message POST
    /// racing this call still finds the session.
    pub async fn connect(
        self: Arc<Self>,
        transport: &Arc<SseTransport>,
    ) -> Result<(), TransportError> {
        let session_id = transport.session_id().to_string();
        let server_id = self.server_id.clone();
        transport.bind(self).await;
        transport.start()?;
        tracing::debug!(
            server_id = %server_id,
            session_id = %session_id,
            "Transport connected"
        );
        Ok(())
    }

    /// Handles one inbound JSON-RPC message.
    ///
    /// Returns `None` for notifications (no `id` member, or a
    /// `notifications/*` method); otherwise a JSON-RPC response object,
    /// which may carry an `error` member for unsupported methods or bad
    /// params.
    pub async fn handle_message(&self, message: Value) -> Option<Value> {
        let id = message.get("id").cloned();
        let method = message.get("method").and_then(Value::as_str);

        let result = match method {
            Some("initialize") => Ok(self.initialize_result(message.get("params"))),
            Some("ping") => Ok(json!({})),
            Some("tools/list") => Ok(self.list_tools().await),
            Some("tools/call") => self.call_tool(message.get("params")).await,
            Some(m) if m.starts_with("notifications/") => return None,
            Some(m) => Err((METHOD_NOT_FOUND, format!("Method '{m}' not supported"))),
            None => Err((INVALID_REQUEST, "Missing method field".to_string())),
        };

        // A request without an id is a notification: no response, even on error.
        let id = id?;

        Some(match result {
            Ok(value) => json!({
                "jsonrpc": "2.0",
                "id": id,
                "result": value,
            }),
            Err((code, message)) => json!({
                "jsonrpc": "2.0",
                "id": id,
                "error": {
                    "code": code,
                    "message": message,
                },
            }),
        })
    }

    fn initialize_result(&self, params: Option<&Value>) -> Value {
        let protocol_version = params
            .and_then(|p| p.get("protocolVersion"))
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_PROTOCOL_VERSION);

        let mut result = json!({
            "protocolVersion": protocol_version,
            "capabilities": {
                "tools": { "listChanged": false },
            },
            "serverInfo": {
                "name": self.info.name,
                "version": self.info.version,
            },
        });

        if let Some(instructions) = &self.options.instructions {
            result["instructions"] = json!(instructions);
        }

        result
    }

    async fn list_tools(&self) -> Value {
        let tools = self.tools.read().await;
        let tools: Vec<Value> = tools
            .iter()
            .map(|tool| {
                let mut def = json!({
                    "name": tool.name,
                    "inputSchema": tool.input_schema,
                });
                if let Some(description) = &tool.description {
                    def["description"] = json!(description);
                }
                def
            })
            .collect();

        json!({ "tools": tools })
    }

    async fn call_tool(&self, params: Option<&Value>) -> Result<Value, (i64, String)> {
        let params = params.ok_or((INVALID_PARAMS, "Missing params field".to_string()))?;
        let name = params
            .get("name")
            .and_then(Value::as_str)
            .ok_or((INVALID_PARAMS, "Missing tool name".to_string()))?;
        let arguments = params.get("arguments").and_then(Value::as_object).cloned();

        let handler = {
            let tools = self.tools.read().await;
            tools
                .iter()
                .find(|tool| tool.name == name)
                .map(|tool| Arc::clone(&tool.handler))
        }
        .ok_or_else(|| (INVALID_PARAMS, format!("Unknown tool: {name}")))?;

        tracing::debug!(server_id = %self.server_id, tool = %name, "Tool call");

        let result = handler(arguments).await;
        serde_json::to_value(&result)
            .map_err(|e| (INTERNAL_ERROR, format!("Failed to serialize result: {e}")))
    }
}
