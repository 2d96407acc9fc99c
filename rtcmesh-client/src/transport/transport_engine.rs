//! Seams between the mesh and the real-time transport engine.
//!
//! The mesh only orchestrates: it asks the engine for connections, session
//! descriptions and channels, and learns about asynchronous progress through
//! [`TransportEvent`](crate::transport::TransportEvent)s posted to the sender
//! it hands out.

use crate::config::ChannelOptions;
use crate::error::TransportError;
use crate::transport::{ChannelKey, ChannelState, EventSender};
use async_trait::async_trait;
use rtcmesh_core::{IceCandidate, PeerId, SessionDescription};
use std::sync::Arc;

/// Creates one transport per remote peer.
#[async_trait]
pub trait TransportEngine: Send + Sync {
    /// Create a connection towards `peer_id`. Every event the connection
    /// produces is posted to `events`, tagged with `peer_id`.
    async fn create_connection(
        &self,
        peer_id: &PeerId,
        events: EventSender,
    ) -> Result<Arc<dyn PeerTransport>, TransportError>;
}

/// A single peer connection owned by the mesh registry.
#[async_trait]
pub trait PeerTransport: Send + Sync {
    async fn create_data_channel(
        &self,
        label: &str,
        options: &ChannelOptions,
    ) -> Result<Arc<dyn ChannelHandle>, TransportError>;

    async fn create_offer(&self) -> Result<SessionDescription, TransportError>;

    async fn create_answer(&self) -> Result<SessionDescription, TransportError>;

    async fn set_local_description(&self, desc: SessionDescription) -> Result<(), TransportError>;

    async fn set_remote_description(&self, desc: SessionDescription)
    -> Result<(), TransportError>;

    /// Merge a remote candidate. Engines may reject candidates that arrive
    /// before the remote description is set.
    async fn add_ice_candidate(&self, candidate: IceCandidate) -> Result<(), TransportError>;

    async fn close(&self) -> Result<(), TransportError>;
}

/// A data channel belonging to a [`PeerTransport`].
#[async_trait]
pub trait ChannelHandle: Send + Sync {
    fn label(&self) -> String;

    fn ready_state(&self) -> ChannelState;

    /// Start reporting state changes and messages as events tagged with `key`.
    /// A channel that is already past `Connecting` reports its current state
    /// immediately.
    fn bind(&self, key: ChannelKey, events: EventSender);

    async fn send_text(&self, text: &str) -> Result<(), TransportError>;

    async fn close(&self) -> Result<(), TransportError>;
}
