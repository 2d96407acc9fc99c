use rtcmesh_client::mock::{MemoryHub, MockNetwork};
use rtcmesh_client::{NegotiationState, SignalingChannel};
use rtcmesh_core::{RoomName, SignalData, SignalMessage};

use crate::integration::init_tracing;
use crate::utils::{TIMEOUT_MS, spawn_peer, test_config};

#[tokio::test]
async fn test_unknown_payload_is_dropped() {
    init_tracing();

    let hub = MemoryHub::new();
    let network = MockNetwork::new();
    let a = spawn_peer(&hub, &network, "a", test_config("lobby"))
        .await
        .unwrap();

    // A bare relay client that never answers.
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

    raw.emit(SignalMessage::Data(SignalData::Unknown))
        .await
        .unwrap();

    // The mesh keeps working after the unrecognized payload.
    let b = spawn_peer(&hub, &network, "b", test_config("lobby"))
        .await
        .unwrap();
    let a_view = a
        .wait_for_snapshot(
            |s| s.peer("b").is_some_and(|p| p.state == NegotiationState::Negotiated),
            TIMEOUT_MS,
        )
        .await
        .unwrap();
    assert_eq!(a_view.peer("x").unwrap().state, NegotiationState::OfferSent);
    assert_eq!(a_view.peers.len(), 2);

    b.handle.close().await.unwrap();
    a.handle.close().await.unwrap();
}
