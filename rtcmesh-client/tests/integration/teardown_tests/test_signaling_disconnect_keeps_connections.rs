use rtcmesh_client::NegotiationState;
use rtcmesh_client::mock::{MemoryHub, MockNetwork};

use crate::integration::init_tracing;
use crate::utils::spawn_mesh;

#[tokio::test]
async fn test_signaling_disconnect_keeps_connections() {
    init_tracing();

    let hub = MemoryHub::new();
    let network = MockNetwork::new();
    let peers = spawn_mesh(&hub, &network, "lobby", &["a", "b"])
        .await
        .expect("Failed to build mesh");
    let a = &peers[0];

    hub.disconnect("a");

    let snapshot = a.snapshot().await.unwrap();
    assert_eq!(snapshot.peer("b").unwrap().state, NegotiationState::Negotiated);
    assert_eq!(a.handle.send_message("over the data channel").await.unwrap(), 1);

    a.handle.close().await.expect("close after relay loss");
    assert!(network.is_closed("a", "b"));
}
