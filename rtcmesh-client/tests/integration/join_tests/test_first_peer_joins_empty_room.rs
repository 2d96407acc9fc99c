use rtcmesh_client::mock::{MemoryHub, MockNetwork};
use rtcmesh_core::{PeerId, RoomName, SignalMessage};

use crate::integration::init_tracing;
use crate::utils::{MeshEvent, spawn_peer, test_config};

#[tokio::test]
async fn test_first_peer_joins_empty_room() {
    init_tracing();

    let hub = MemoryHub::new();
    let network = MockNetwork::new();
    let a = spawn_peer(&hub, &network, "a", test_config("lobby"))
        .await
        .expect("Failed to spawn peer");

    assert_eq!(
        hub.sent_by("a"),
        vec![SignalMessage::Join(RoomName::from("lobby"))]
    );

    let snapshot = a.snapshot().await.unwrap();
    assert_eq!(snapshot.room, RoomName::from("lobby"));
    assert_eq!(snapshot.local_peer_id, Some(PeerId::from("a")));
    assert!(snapshot.peers.is_empty());
    assert!(snapshot.members.is_empty());
    assert!(snapshot.channels.is_empty());
    assert_eq!(a.recorder.events(), vec![MeshEvent::Ready]);

    assert_eq!(a.handle.send_message("nobody here").await.unwrap(), 0);
    a.handle.close().await.unwrap();
}
