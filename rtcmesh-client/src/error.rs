use crate::registry::NegotiationState;
use rtcmesh_core::PeerId;
use thiserror::Error;

/// Failures reported by a transport engine or one of its channels.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TransportError {
    #[error("transport engine error: {0}")]
    Engine(String),

    #[error("invalid session description: {0}")]
    InvalidDescription(String),

    #[error("data channel is not open")]
    ChannelNotOpen,

    #[error("transport closed")]
    Closed,
}

#[derive(Debug, Error)]
pub enum SignalingError {
    #[error("failed to connect to signaling server: {0}")]
    Connect(String),

    #[error("failed to send signaling message: {0}")]
    Send(String),

    #[error("signaling channel closed")]
    Closed,

    #[error("signaling codec error: {0}")]
    Codec(#[from] serde_json::Error),
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RegistryError {
    #[error("peer connection for {0} already exists")]
    AlreadyExists(PeerId),

    #[error("no peer connection for {0}")]
    NotFound(PeerId),
}

#[derive(Debug, Error)]
pub enum NegotiationError {
    #[error("unexpected {signal} from {peer_id} in state {state:?}")]
    UnexpectedSignal {
        peer_id: PeerId,
        state: NegotiationState,
        signal: &'static str,
    },

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Signaling(#[from] SignalingError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Errors surfaced through the public mesh API.
#[derive(Debug, Error)]
pub enum MeshError {
    #[error("mesh is closed")]
    Closed,

    #[error("failed to send to {peer_id}: {source}")]
    Send {
        peer_id: PeerId,
        #[source]
        source: TransportError,
    },

    #[error(transparent)]
    Signaling(#[from] SignalingError),

    #[error(transparent)]
    Transport(#[from] TransportError),
}
