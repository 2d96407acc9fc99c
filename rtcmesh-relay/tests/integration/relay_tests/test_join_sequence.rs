use rtcmesh_core::SignalMessage;

use crate::integration::init_tracing;
use crate::utils::{RelayClient, TIMEOUT_MS, spawn_relay};

#[tokio::test]
async fn test_join_sequence() {
    init_tracing();

    let relay = spawn_relay().await.expect("Failed to spawn relay");
    let mut a = RelayClient::connect(&relay).await.unwrap();
    let mut b = RelayClient::connect(&relay).await.unwrap();

    a.send(SignalMessage::Join("lobby".into())).await.unwrap();
    let SignalMessage::Created(created_id) = a.next_message(TIMEOUT_MS).await.unwrap() else {
        panic!("first member should be told the room was created");
    };
    let SignalMessage::Joined { id: a_id, peers } = a.next_message(TIMEOUT_MS).await.unwrap()
    else {
        panic!("expected joined");
    };
    assert_eq!(created_id, a_id);
    assert!(peers.is_empty());

    b.send(SignalMessage::Join("lobby".into())).await.unwrap();
    let SignalMessage::Joined { id: b_id, peers } = b.next_message(TIMEOUT_MS).await.unwrap()
    else {
        panic!("second member should not see created");
    };
    assert_ne!(a_id, b_id);
    assert_eq!(peers, vec![a_id.clone()]);

    assert_eq!(
        a.next_message(TIMEOUT_MS).await.unwrap(),
        SignalMessage::NewPeer(b_id)
    );
}
