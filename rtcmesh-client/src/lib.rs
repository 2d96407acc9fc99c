//! Peer-to-peer mesh orchestration for a named room.
//!
//! A [`Mesh`] joins a room through a [`SignalingChannel`], negotiates one
//! connection per room member through a [`TransportEngine`], and exposes the
//! resulting data channels through [`MeshHandle`].

pub mod channel;
pub mod config;
pub mod error;
pub mod mesh;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod negotiation;
pub mod registry;
pub mod signaling;
pub mod transport;

pub use channel::{DataChannelManager, TrackedChannel};
pub use config::{ChannelOptions, MeshConfig, RtcOptions};
pub use error::{
    ConfigError, MeshError, NegotiationError, RegistryError, SignalingError, TransportError,
};
pub use mesh::{
    Callback, Callbacks, ChannelSummary, Mesh, MeshHandle, MeshMessage, MeshSnapshot, PeerSummary,
    Room,
};
pub use negotiation::{CandidateExchange, OfferAnswerNegotiator};
pub use registry::{NegotiationState, PeerConnection, PeerConnectionRegistry, Role};
pub use signaling::{SignalEvent, SignalEventReceiver, SignalingChannel, WsSignaling};
pub use transport::{
    ChannelHandle, ChannelState, ConnectionState, PeerTransport, TransportEngine, WebRtcEngine,
};
