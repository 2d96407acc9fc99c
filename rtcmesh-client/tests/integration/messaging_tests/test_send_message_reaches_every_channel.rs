use rtcmesh_client::MeshMessage;
use rtcmesh_client::mock::{MemoryHub, MockNetwork};
use rtcmesh_core::PeerId;

use crate::integration::init_tracing;
use crate::utils::{TIMEOUT_MS, spawn_mesh};

#[tokio::test]
async fn test_send_message_reaches_every_channel() {
    init_tracing();

    let hub = MemoryHub::new();
    let network = MockNetwork::new();
    let peers = spawn_mesh(&hub, &network, "lobby", &["a", "b", "c", "d"])
        .await
        .expect("Failed to build mesh");
    let a = &peers[0];

    let sent = a.handle.send_message("hello").await.unwrap();
    assert_eq!(sent, 3);

    let mut recipients: Vec<PeerId> = network
        .sent()
        .into_iter()
        .filter(|s| s.from == a.id && s.text == "hello")
        .map(|s| s.to)
        .collect();
    recipients.sort();
    assert_eq!(
        recipients,
        vec![PeerId::from("b"), PeerId::from("c"), PeerId::from("d")]
    );

    let expected = MeshMessage {
        text: "hello".to_owned(),
        sender: a.id.clone(),
    };
    for peer in &peers[1..] {
        let received = peer
            .recorder
            .wait_for_messages(1, TIMEOUT_MS)
            .await;
        assert!(received, "{} never received the message", peer.id);
        assert_eq!(peer.recorder.messages(), vec![expected.clone()]);
    }
}

#[tokio::test]
async fn test_responder_channels_carry_messages_back() {
    init_tracing();

    let hub = MemoryHub::new();
    let network = MockNetwork::new();
    let peers = spawn_mesh(&hub, &network, "lobby", &["a", "b"])
        .await
        .expect("Failed to build mesh");
    let (a, b) = (&peers[0], &peers[1]);

    assert_eq!(b.handle.send_message("pong").await.unwrap(), 1);
    let received = a
        .recorder
        .wait_for_messages(1, TIMEOUT_MS)
        .await;
    assert!(received);
    assert_eq!(a.recorder.messages()[0].sender, b.id);
}
