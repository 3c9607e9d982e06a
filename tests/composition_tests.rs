use mcpmux::config::{McpServerConfig, MountConfig};
use mcpmux::error::McpError;
use mcpmux::mcp::{Composition, McpModule};

// Test 1: Scoped mounts own independent registry pairs
#[tokio::test]
async fn test_scoped_modules_are_independent() {
    let first = McpModule::new(
        Composition::Scoped(MountConfig::new("/a")),
        vec![McpServerConfig::new("s1", "server-one", "1.0.0")],
    )
    .await
    .expect("scoped module construction should succeed");

    let second = McpModule::new(Composition::Scoped(MountConfig::new("/b")), vec![])
        .await
        .expect("scoped module construction should succeed");

    assert!(first.get_server("s1").await.is_some());
    assert!(
        second.get_server("s1").await.is_none(),
        "Scoped mounts must not share server registrations"
    );
}

// Test 2: Augmentation adds servers to the shared pair
#[tokio::test]
async fn test_singleton_augmentation() {
    let shared = McpModule::new(
        Composition::Singleton(MountConfig::new("/mcp")),
        vec![McpServerConfig::new("s1", "server-one", "1.0.0")],
    )
    .await
    .expect("singleton construction should succeed");

    let augmented = McpModule::new(
        Composition::SingletonAugment(Some(shared.clone())),
        vec![McpServerConfig::new("s2", "server-two", "1.0.0")],
    )
    .await
    .expect("augmentation of an existing handle should succeed");

    // Both handles see both servers.
    assert!(shared.get_server("s1").await.is_some());
    assert!(
        shared.get_server("s2").await.is_some(),
        "Augmented servers must be visible through the original handle"
    );
    assert!(augmented.get_server("s1").await.is_some());

    let ids = shared.server_registry().read().await.server_ids();
    assert_eq!(ids, vec!["s1", "s2"]);
}

// Test 3: Augmenting an already-registered id keeps the first config
#[tokio::test]
async fn test_augmentation_is_idempotent_per_id() {
    let shared = McpModule::new(
        Composition::Singleton(MountConfig::new("/mcp")),
        vec![McpServerConfig::new("s1", "A", "1.0.0")],
    )
    .await
    .expect("singleton construction should succeed");

    McpModule::new(
        Composition::SingletonAugment(Some(shared.clone())),
        vec![McpServerConfig::new("s1", "B", "2.0.0")],
    )
    .await
    .expect("augmentation should succeed");

    let server = shared
        .get_server("s1")
        .await
        .expect("s1 should still be registered");
    assert_eq!(
        server.info().name,
        "A",
        "First registration must win across augmentation"
    );
}

// Test 4: Augmentation without a shared pair is a configuration error
#[tokio::test]
async fn test_augmentation_without_singleton_fails() {
    let err = McpModule::new(
        Composition::SingletonAugment(None),
        vec![McpServerConfig::new("s1", "server-one", "1.0.0")],
    )
    .await
    .expect_err("augmenting a never-created pair must fail");

    assert!(
        matches!(err, McpError::SharedPairMissing),
        "Expected SharedPairMissing, got: {err:?}"
    );
}

// Test 5: Runtime registration through a handle is visible to all clones
#[tokio::test]
async fn test_runtime_registration_through_clone() {
    let shared = McpModule::new(Composition::Singleton(MountConfig::new("/mcp")), vec![])
        .await
        .expect("singleton construction should succeed");

    let clone = shared.clone();
    clone
        .register_server(McpServerConfig::new("late", "late-server", "0.1.0"))
        .await;

    assert!(
        shared.get_server("late").await.is_some(),
        "Clones share the same registry pair"
    );
}
