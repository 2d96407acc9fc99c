use rtcmesh_core::{IceCandidate, SignalData, SignalMessage};

use crate::integration::init_tracing;
use crate::utils::{RelayClient, TIMEOUT_MS, spawn_relay};

#[tokio::test]
async fn test_data_routing() {
    init_tracing();

    let relay = spawn_relay().await.expect("Failed to spawn relay");
    let mut a = RelayClient::connect(&relay).await.unwrap();
    let mut b = RelayClient::connect(&relay).await.unwrap();
    let mut c = RelayClient::connect(&relay).await.unwrap();
    let mut x = RelayClient::connect(&relay).await.unwrap();

    let a_id = a.join("lobby").await.unwrap();
    let b_id = b.join("lobby").await.unwrap();
    let _c_id = c.join("lobby").await.unwrap();
    x.join("elsewhere").await.unwrap();

    // new peer notices: b and c for a, c for b
    for _ in 0..2 {
        a.next_message(TIMEOUT_MS).await.unwrap();
    }
    b.next_message(TIMEOUT_MS).await.unwrap();

    let offer = SignalData::Offer {
        sdp: "v=0".to_owned(),
        from: a_id.clone(),
        to: b_id.clone(),
    };
    a.send(SignalMessage::Data(offer.clone())).await.unwrap();
    assert_eq!(
        b.next_message(TIMEOUT_MS).await.unwrap(),
        SignalMessage::Data(offer)
    );
    assert!(c.stays_silent(200).await);

    let candidate = SignalData::Candidate {
        candidate: Some(IceCandidate::new("candidate:1 1 udp 1 10.0.0.1 5000 typ host")),
        id: a_id,
        to: None,
    };
    a.send(SignalMessage::Data(candidate.clone())).await.unwrap();
    for client in [&mut b, &mut c] {
        assert_eq!(
            client.next_message(TIMEOUT_MS).await.unwrap(),
            SignalMessage::Data(candidate.clone())
        );
    }
    assert!(x.stays_silent(200).await);
    assert!(a.stays_silent(50).await);
}
