use futures::{SinkExt, StreamExt};
use rtcmesh_core::SignalMessage;
use std::time::Duration;
use tokio_tungstenite::tungstenite::Message;

use crate::integration::init_tracing;
use crate::utils::{TIMEOUT_MS, spawn_relay};

#[tokio::test]
async fn test_malformed_frame_is_ignored() {
    init_tracing();

    let relay = spawn_relay().await.expect("Failed to spawn relay");
    let (mut socket, _) = tokio_tungstenite::connect_async(relay.url())
        .await
        .expect("Failed to connect");

    socket.send(Message::Text("not json".into())).await.unwrap();
    socket
        .send(Message::Text(r#"{"op":"teleport","d":1}"#.into()))
        .await
        .unwrap();
    socket
        .send(Message::Text(r#"{"op":"join","d":"lobby"}"#.into()))
        .await
        .unwrap();

    let frame = tokio::time::timeout(Duration::from_millis(TIMEOUT_MS), socket.next())
        .await
        .expect("relay went silent")
        .expect("socket closed")
        .unwrap();
    let Message::Text(text) = frame else {
        panic!("expected a text frame, got {:?}", frame);
    };
    let msg: SignalMessage = serde_json::from_str(&text).unwrap();
    assert!(matches!(msg, SignalMessage::Created(_)));
    assert_eq!(relay.service.peer_count(), 1);
}
