use mcpmux::config::McpServerConfig;
use mcpmux::mcp::server_registry::{McpServerRegistry, RegistryError};
use mcpmux::mcp::sse_transport::SseTransport;
use std::sync::Arc;
use tokio::sync::mpsc;

fn transport() -> (Arc<SseTransport>, mpsc::UnboundedReceiver<axum::response::sse::Event>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (Arc::new(SseTransport::new("messages", tx)), rx)
}

// Test 1: Empty registry
#[tokio::test]
async fn test_registry_new() {
    let registry = McpServerRegistry::new();

    assert!(
        !registry.has_server("any-id"),
        "Empty registry should not report any server"
    );
    assert!(
        registry.get_server("any-id").is_none(),
        "Empty registry should return None for any id"
    );
    assert!(
        registry.server_ids().is_empty(),
        "Empty registry should have no server ids"
    );
}

// Test 2: Register a server
#[tokio::test]
async fn test_register_server() {
    let mut registry = McpServerRegistry::new();

    let server = registry.register_server(McpServerConfig::new("s1", "server-one", "1.0.0"));

    assert_eq!(server.server_id(), "s1");
    assert_eq!(server.info().name, "server-one");
    assert!(registry.has_server("s1"), "Registered id should be present");

    let looked_up = registry
        .get_server("s1")
        .expect("get_server should return the registered instance");
    assert!(
        Arc::ptr_eq(&server, &looked_up),
        "Lookup should hand out the same instance"
    );
}

// Test 3: Registration is idempotent, first write wins
#[tokio::test]
async fn test_register_duplicate_keeps_first_config() {
    let mut registry = McpServerRegistry::new();

    let first = registry.register_server(McpServerConfig::new("s1", "A", "1.0.0"));
    let second = registry.register_server(McpServerConfig::new("s1", "B", "2.0.0"));

    assert!(
        Arc::ptr_eq(&first, &second),
        "Second registration should return the existing instance"
    );

    let server = registry
        .get_server("s1")
        .expect("Server should still be registered");
    assert_eq!(
        server.info().name,
        "A",
        "Config of the second registration must be ignored"
    );
    assert_eq!(server.info().version, "1.0.0");
    assert_eq!(
        registry.server_ids().len(),
        1,
        "Duplicate registration must not add an id"
    );
}

// Test 4: server_ids reflects registration order
#[tokio::test]
async fn test_server_ids_insertion_order() {
    let mut registry = McpServerRegistry::new();

    registry.register_server(McpServerConfig::new("alpha", "a", "1.0.0"));
    registry.register_server(McpServerConfig::new("beta", "b", "1.0.0"));
    registry.register_server(McpServerConfig::new("gamma", "c", "1.0.0"));

    assert_eq!(registry.server_ids(), vec!["alpha", "beta", "gamma"]);

    // The snapshot is not a live view.
    let snapshot = registry.server_ids();
    registry.register_server(McpServerConfig::new("delta", "d", "1.0.0"));
    assert_eq!(snapshot, vec!["alpha", "beta", "gamma"]);
    assert_eq!(
        registry.server_ids(),
        vec!["alpha", "beta", "gamma", "delta"]
    );
}

// Test 5: Unknown server is not found
#[tokio::test]
async fn test_unknown_server_absent() {
    let registry = McpServerRegistry::new();

    assert!(!registry.has_server("ghost"));
    assert!(registry.get_server("ghost").is_none());
}

// Test 6: connect fails for an unknown server id
#[tokio::test]
async fn test_connect_unknown_server() {
    let registry = McpServerRegistry::new();
    let (transport, _rx) = transport();

    let err = registry
        .connect("ghost", &transport)
        .await
        .expect_err("connect should fail for an unknown server");

    assert!(
        matches!(err, RegistryError::ServerNotFound(ref id) if id == "ghost"),
        "Error should name the missing id, got: {err:?}"
    );
}

// Test 7: connect binds the transport and starts the handshake
#[tokio::test]
async fn test_connect_starts_handshake() {
    let mut registry = McpServerRegistry::new();
    registry.register_server(McpServerConfig::new("s1", "server-one", "1.0.0"));

    let (transport, mut rx) = transport();
    registry
        .connect("s1", &transport)
        .await
        .expect("connect should succeed for a registered server");

    assert!(
        rx.recv().await.is_some(),
        "connect should emit the endpoint event on the stream"
    );
}
