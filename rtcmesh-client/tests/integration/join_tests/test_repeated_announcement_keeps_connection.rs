use rtcmesh_client::mock::{MemoryHub, MockNetwork};
use rtcmesh_client::{NegotiationState, Role, SignalingChannel};
use rtcmesh_core::{RoomName, SignalMessage};
use std::time::Duration;

use crate::integration::init_tracing;
use crate::utils::{TIMEOUT_MS, spawn_peer, test_config};

#[tokio::test]
async fn test_repeated_announcement_keeps_connection() {
    init_tracing();

    let hub = MemoryHub::new();
    let network = MockNetwork::new();
    let a = spawn_peer(&hub, &network, "a", test_config("lobby"))
        .await
        .unwrap();

    let (raw, _raw_rx) = hub.connect_as("x");
    raw.emit(SignalMessage::Join(RoomName::from("lobby")))
        .await
        .unwrap();
    a.wait_for_snapshot(
        |s| s.peer("x").is_some_and(|p| p.state == NegotiationState::OfferSent),
        TIMEOUT_MS,
    )
    .await
    .unwrap();

    // Rejoining the same room announces x to a a second time.
    raw.emit(SignalMessage::Join(RoomName::from("lobby")))
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;

    let snapshot = a.handle.snapshot().await.unwrap();
    assert_eq!(snapshot.peers.len(), 1);
    let x = snapshot.peer("x").unwrap();
    assert_eq!(x.role, Role::Initiator);
    assert_eq!(x.state, NegotiationState::OfferSent);
    assert!(!network.is_closed("a", "x"));

    a.handle.close().await.unwrap();
}
