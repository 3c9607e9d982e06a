use anyhow::Context;
use clap::Parser;
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mcpmux::config::{McpServerConfig, MountConfig};
use mcpmux::mcp::{Composition, McpModule, ToolResult};

#[derive(Parser, Debug)]
#[command(name = "mcpmux", about = "Multiplex MCP servers behind one HTTP listener")]
struct Args {
    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1:3000")]
    bind: String,

    /// Base path the MCP routes are mounted under
    #[arg(long, default_value = "/mcp")]
    base_path: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mcpmux=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    // One shared registry pair for the whole process; demo servers mirror
    // the calculator/clock pair most MCP clients are tested against.
    let module = McpModule::new(
        Composition::Singleton(MountConfig::new(&args.base_path)),
        vec![
            McpServerConfig::new("calculator", "calculator-server", "1.0.0")
                .with_instructions("Basic arithmetic over two operands"),
            McpServerConfig::new("clock", "clock-server", "1.0.0"),
        ],
    )
    .await?;

    register_demo_tools(&module).await?;

    let app = module
        .router()
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(args.bind.as_str())
        .await
        .with_context(|| format!("failed to bind {}", args.bind))?;

    tracing::info!(addr = %args.bind, base_path = %args.base_path, "mcpmux listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn register_demo_tools(module: &McpModule) -> anyhow::Result<()> {
    let calculator = module
        .get_server("calculator")
        .await
        .context("calculator server missing")?;

    calculator
        .register_tool(
            "calculate",
            Some("Perform a basic arithmetic operation on two numbers"),
            json!({
                "type": "object",
                "properties": {
                    "operation": {
                        "type": "string",
                        "enum": ["add", "subtract", "multiply", "divide"],
                    },
                    "a": { "type": "number" },
                    "b": { "type": "number" },
                },
                "required": ["operation", "a", "b"],
            }),
            |args| async move {
                let args = args.unwrap_or_default();
                let operation = args.get("operation").and_then(Value::as_str);
                let a = args.get("a").and_then(Value::as_f64);
                let b = args.get("b").and_then(Value::as_f64);

                let (operation, a, b) = match (operation, a, b) {
                    (Some(operation), Some(a), Some(b)) => (operation, a, b),
                    _ => return ToolResult::error("expected operation, a and b"),
                };

                match operation {
                    "add" => ToolResult::text((a + b).to_string()),
                    "subtract" => ToolResult::text((a - b).to_string()),
                    "multiply" => ToolResult::text((a * b).to_string()),
                    "divide" if b == 0.0 => ToolResult::error("division by zero"),
                    "divide" => ToolResult::text((a / b).to_string()),
                    other => ToolResult::error(format!("unsupported operation: {other}")),
                }
            },
        )
        .await;

    let clock = module
        .get_server("clock")
        .await
        .context("clock server missing")?;

    clock
        .register_tool(
            "get-time",
            Some("Current time in iso, locale or unix format"),
            json!({
                "type": "object",
                "properties": {
                    "format": {
                        "type": "string",
                        "enum": ["iso", "locale", "unix"],
                    },
                },
            }),
            |args| async move {
                let now = chrono::Utc::now();
                let format = args
                    .as_ref()
                    .and_then(|a| a.get("format"))
                    .and_then(Value::as_str)
                    .unwrap_or("iso");

                match format {
                    "iso" => ToolResult::text(now.to_rfc3339()),
                    "locale" => ToolResult::text(now.format("%c").to_string()),
                    "unix" => ToolResult::text(now.timestamp().to_string()),
                    other => ToolResult::error(format!("unsupported format: {other}")),
                }
            },
        )
        .await;

    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        tracing::error!("failed to install ctrl-c handler");
        return;
    }
    tracing::info!("shutdown signal received");
}
