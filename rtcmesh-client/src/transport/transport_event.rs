use crate::transport::ChannelHandle;
use rtcmesh_core::{IceCandidate, PeerId};
use std::fmt;
use std::sync::Arc;
use tokio::sync::mpsc;

pub type EventSender = mpsc::UnboundedSender<TransportEvent>;
pub type EventReceiver = mpsc::UnboundedReceiver<TransportEvent>;

/// Identifies a data channel tracked by the mesh.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct ChannelKey(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    Connecting,
    Open,
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    New,
    Connecting,
    Connected,
    Disconnected,
    Failed,
    Closed,
}

impl ConnectionState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ConnectionState::Disconnected | ConnectionState::Failed | ConnectionState::Closed
        )
    }
}

/// Events a transport engine reports back to the mesh.
pub enum TransportEvent {
    /// A local candidate was gathered. `None` marks the end of gathering.
    CandidateDiscovered {
        peer_id: PeerId,
        candidate: Option<IceCandidate>,
    },

    /// The remote side opened a data channel on this connection.
    DataChannelAnnounced {
        peer_id: PeerId,
        channel: Arc<dyn ChannelHandle>,
    },

    ConnectionStateChanged {
        peer_id: PeerId,
        state: ConnectionState,
    },

    /// A bound channel changed its ready state.
    ChannelStateChanged { key: ChannelKey, state: ChannelState },

    /// A bound channel received a message.
    ChannelMessage { key: ChannelKey, text: String },
}

impl fmt::Debug for TransportEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportEvent::CandidateDiscovered { peer_id, candidate } => f
                .debug_struct("CandidateDiscovered")
                .field("peer_id", peer_id)
                .field("candidate", candidate)
                .finish(),
            TransportEvent::DataChannelAnnounced { peer_id, channel } => f
                .debug_struct("DataChannelAnnounced")
                .field("peer_id", peer_id)
                .field("label", &channel.label())
                .finish(),
            TransportEvent::ConnectionStateChanged { peer_id, state } => f
                .debug_struct("ConnectionStateChanged")
                .field("peer_id", peer_id)
                .field("state", state)
                .finish(),
            TransportEvent::ChannelStateChanged { key, state } => f
                .debug_struct("ChannelStateChanged")
                .field("key", key)
                .field("state", state)
                .finish(),
            TransportEvent::ChannelMessage { key, text } => f
                .debug_struct("ChannelMessage")
                .field("key", key)
                .field("len", &text.len())
                .finish(),
        }
    }
}
