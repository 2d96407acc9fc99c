use crate::utils::EventRecorder;
use anyhow::{Context, Result, bail};
use rtcmesh_client::mock::{MemoryHub, MockNetwork};
use rtcmesh_client::{MeshConfig, Mesh, MeshHandle, MeshSnapshot, NegotiationState};
use rtcmesh_core::PeerId;
use std::sync::Arc;
use std::time::{Duration, Instant};

pub const TIMEOUT_MS: u64 = 5000;

/// A mesh member driven by the in-memory relay and transport.
pub struct TestPeer {
    pub id: PeerId,
    pub handle: MeshHandle,
    pub recorder: EventRecorder,
}

impl TestPeer {
    pub async fn snapshot(&self) -> Result<MeshSnapshot> {
        self.handle
            .snapshot()
            .await
            .with_context(|| format!("snapshot of {}", self.id))
    }

    /// Polls the snapshot until `pred` holds.
    pub async fn wait_for_snapshot(
        &self,
        pred: impl Fn(&MeshSnapshot) -> bool,
        timeout_ms: u64,
    ) -> Result<MeshSnapshot> {
        let start = Instant::now();
        let timeout = Duration::from_millis(timeout_ms);

        loop {
            let snapshot = self.snapshot().await?;
            if pred(&snapshot) {
                return Ok(snapshot);
            }
            if start.elapsed() > timeout {
                bail!("{} never reached the expected state: {:#?}", self.id, snapshot);
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }
}

pub fn test_config(room: &str) -> MeshConfig {
    MeshConfig {
        room_name: room.to_owned(),
        debug_mode: true,
        ..MeshConfig::default()
    }
}

/// Starts a mesh for `id` and waits for its `ready` event.
pub async fn spawn_peer(
    hub: &MemoryHub,
    network: &MockNetwork,
    id: &str,
    config: MeshConfig,
) -> Result<TestPeer> {
    let (signaling, signal_rx) = hub.connect_as(id);
    let mut mesh = Mesh::new(
        config,
        Arc::new(network.engine(id)),
        Arc::new(signaling),
        signal_rx,
    );

    let recorder = EventRecorder::new();
    recorder.attach(&mut mesh);
    let peer = TestPeer {
        id: PeerId::from(id),
        handle: mesh.start(),
        recorder,
    };

    if !peer.recorder.wait_for_ready(TIMEOUT_MS).await {
        bail!("{id} never became ready");
    }
    Ok(peer)
}

/// Joins every id to `room` in order, then waits until each pair is
/// negotiated and every channel is open.
pub async fn spawn_mesh(
    hub: &MemoryHub,
    network: &MockNetwork,
    room: &str,
    ids: &[&str],
) -> Result<Vec<TestPeer>> {
    let mut peers = Vec::new();
    for id in ids {
        peers.push(spawn_peer(hub, network, id, test_config(room)).await?);
    }

    let others = ids.len() - 1;
    for peer in &peers {
        peer.wait_for_snapshot(
            |s| {
                s.peers.len() == others
                    && s.peers.iter().all(|p| p.state == NegotiationState::Negotiated)
                    && s.open_channels() == others
            },
            TIMEOUT_MS,
        )
        .await?;
    }
    Ok(peers)
}

/// Polls `cond` until it holds or the timeout expires.
pub async fn wait_until(cond: impl Fn() -> bool, timeout_ms: u64) -> bool {
    let start = Instant::now();
    let timeout = Duration::from_millis(timeout_ms);

    loop {
        if cond() {
            return true;
        }
        if start.elapsed() > timeout {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
