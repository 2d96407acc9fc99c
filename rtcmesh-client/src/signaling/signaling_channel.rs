use crate::error::SignalingError;
use async_trait::async_trait;
use rtcmesh_core::SignalMessage;
use tokio::sync::mpsc;

/// Inbound side of a signaling channel.
#[derive(Debug, Clone, PartialEq)]
pub enum SignalEvent {
    /// The channel is established; the mesh answers with a join request.
    Connected,
    Message(SignalMessage),
    /// The relay went away. Existing peer connections are left as they are.
    Disconnected,
}

pub type SignalEventSender = mpsc::UnboundedSender<SignalEvent>;
pub type SignalEventReceiver = mpsc::UnboundedReceiver<SignalEvent>;

/// Outbound side of a room-scoped signaling relay.
#[async_trait]
pub trait SignalingChannel: Send + Sync {
    async fn emit(&self, msg: SignalMessage) -> Result<(), SignalingError>;

    async fn close(&self) -> Result<(), SignalingError>;

    fn is_closed(&self) -> bool;
}
