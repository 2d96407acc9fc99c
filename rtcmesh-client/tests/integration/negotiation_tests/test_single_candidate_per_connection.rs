use rtcmesh_client::MeshConfig;
use rtcmesh_client::mock::{MemoryHub, MockNetwork};
use rtcmesh_core::{SignalData, SignalMessage};

use crate::integration::init_tracing;
use crate::utils::{TIMEOUT_MS, spawn_mesh, spawn_peer, test_config, wait_until};

fn candidates_sent(hub: &MemoryHub, id: &str) -> usize {
    hub.sent_by(id)
        .iter()
        .filter(|m| matches!(m, SignalMessage::Data(SignalData::Candidate { .. })))
        .count()
}

#[tokio::test]
async fn test_single_candidate_per_connection() {
    init_tracing();

    let hub = MemoryHub::new();
    let network = MockNetwork::new();
    let peers = spawn_mesh(&hub, &network, "lobby", &["a", "b", "c"])
        .await
        .expect("Failed to build mesh");

    // The engine gathers two candidates per connection; only the first leaves.
    for peer in &peers {
        let snapshot = peer.snapshot().await.unwrap();
        assert!(snapshot.peers.iter().all(|p| p.candidate_sent));
        assert_eq!(candidates_sent(&hub, peer.id.as_str()), 2);
    }
}

#[tokio::test]
async fn test_trickle_all_forwards_every_candidate() {
    init_tracing();

    let hub = MemoryHub::new();
    let network = MockNetwork::new();
    let config = MeshConfig {
        trickle_all_candidates: true,
        ..test_config("lobby")
    };
    let _a = spawn_peer(&hub, &network, "a", config.clone())
        .await
        .expect("Failed to spawn A");
    let _b = spawn_peer(&hub, &network, "b", config)
        .await
        .expect("Failed to spawn B");

    assert!(wait_until(|| candidates_sent(&hub, "a") == 2, TIMEOUT_MS).await);
    assert!(wait_until(|| candidates_sent(&hub, "b") == 2, TIMEOUT_MS).await);
    assert!(wait_until(|| network.accepted_candidates("a", "b") == 2, TIMEOUT_MS).await);
}
