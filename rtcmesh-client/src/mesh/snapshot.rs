use crate::registry::{NegotiationState, Role};
use crate::transport::ChannelState;
use rtcmesh_core::{PeerId, RoomName};

/// Point-in-time view of a mesh, for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeshSnapshot {
    pub room: RoomName,
    pub local_peer_id: Option<PeerId>,
    pub members: Vec<PeerId>,
    /// Sorted by peer id.
    pub peers: Vec<PeerSummary>,
    pub channels: Vec<ChannelSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerSummary {
    pub peer_id: PeerId,
    pub role: Role,
    pub state: NegotiationState,
    pub candidate_sent: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelSummary {
    pub owner: PeerId,
    pub label: String,
    pub ready_state: ChannelState,
}

impl MeshSnapshot {
    pub fn peer(&self, peer_id: &str) -> Option<&PeerSummary> {
        self.peers.iter().find(|p| p.peer_id.as_str() == peer_id)
    }

    pub fn open_channels(&self) -> usize {
        self.channels
            .iter()
            .filter(|c| c.ready_state == ChannelState::Open)
            .count()
    }
}
