use rtcmesh_client::mock::{MemoryHub, MockNetwork};
use rtcmesh_core::PeerId;

use crate::integration::init_tracing;
use crate::utils::{MeshEvent, TIMEOUT_MS, spawn_mesh};

#[tokio::test]
async fn test_remote_close_removes_peer() {
    init_tracing();

    let hub = MemoryHub::new();
    let network = MockNetwork::new();
    let peers = spawn_mesh(&hub, &network, "lobby", &["a", "b", "c"])
        .await
        .expect("Failed to build mesh");
    let (a, b, c) = (&peers[0], &peers[1], &peers[2]);

    a.handle.close().await.unwrap();

    for peer in [b, c] {
        let snapshot = peer
            .wait_for_snapshot(|s| s.peer("a").is_none(), TIMEOUT_MS)
            .await
            .unwrap();
        assert_eq!(snapshot.peers.len(), 1);
        assert_eq!(snapshot.channels.len(), 1);
        assert!(!snapshot.members.contains(&PeerId::from("a")));

        let not_ready = MeshEvent::ChannelNotReady(PeerId::from("a"));
        assert!(
            peer.recorder
                .wait_for(|events| events.contains(&not_ready), TIMEOUT_MS)
                .await
        );
    }

    // The survivors still talk to each other.
    assert_eq!(b.handle.send_message("still here").await.unwrap(), 1);
    let received = c
        .recorder
        .wait_for_messages(1, TIMEOUT_MS)
        .await;
    assert!(received);
}
