use rtcmesh_client::MeshError;
use rtcmesh_client::mock::{MemoryHub, MockNetwork};

use crate::integration::init_tracing;
use crate::utils::{TIMEOUT_MS, spawn_mesh, wait_until};

#[tokio::test]
async fn test_close_tears_down_mesh() {
    init_tracing();

    let hub = MemoryHub::new();
    let network = MockNetwork::new();
    let peers = spawn_mesh(&hub, &network, "lobby", &["a", "b", "c"])
        .await
        .expect("Failed to build mesh");
    let a = &peers[0];

    a.handle.close().await.expect("Failed to close");

    assert!(network.is_closed("a", "b"));
    assert!(network.is_closed("a", "c"));
    assert!(!hub.is_connected("a"));
    assert!(wait_until(|| a.handle.is_closed(), TIMEOUT_MS).await);

    assert!(matches!(a.handle.close().await, Err(MeshError::Closed)));
    assert!(matches!(a.handle.send_message("late").await, Err(MeshError::Closed)));
    assert!(a.handle.snapshot().await.is_err());
}

#[tokio::test]
async fn test_dropping_every_handle_closes_mesh() {
    init_tracing();

    let hub = MemoryHub::new();
    let network = MockNetwork::new();
    let mut peers = spawn_mesh(&hub, &network, "lobby", &["a", "b"])
        .await
        .expect("Failed to build mesh");

    let b = peers.pop().unwrap();
    drop(b);

    assert!(wait_until(|| !hub.is_connected("b"), TIMEOUT_MS).await);
    assert!(wait_until(|| network.is_closed("b", "a"), TIMEOUT_MS).await);

    let a = &peers[0];
    a.wait_for_snapshot(|s| s.peers.is_empty(), TIMEOUT_MS)
        .await
        .unwrap();
}
