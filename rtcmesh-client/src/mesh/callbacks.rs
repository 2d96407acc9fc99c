use rtcmesh_core::PeerId;
use std::fmt;

pub type ReadyHandler = Box<dyn Fn() + Send + Sync>;
pub type ChannelHandler = Box<dyn Fn(&PeerId) + Send + Sync>;
pub type MessageHandler = Box<dyn Fn(MeshMessage) + Send + Sync>;

/// Payload of the `message` event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeshMessage {
    pub text: String,
    /// Peer owning the channel the message arrived on.
    pub sender: PeerId,
}

/// A handler for one of the mesh events.
pub enum Callback {
    /// `ready`: the room join was acknowledged.
    Ready(ReadyHandler),
    /// `channel:ready`: a data channel towards the given peer opened.
    ChannelReady(ChannelHandler),
    /// `channel:notready`: a data channel reported any state other than open.
    ChannelNotReady(ChannelHandler),
    /// `message`: text arrived on a data channel.
    Message(MessageHandler),
}

impl Callback {
    pub fn ready(f: impl Fn() + Send + Sync + 'static) -> Self {
        Callback::Ready(Box::new(f))
    }

    pub fn channel_ready(f: impl Fn(&PeerId) + Send + Sync + 'static) -> Self {
        Callback::ChannelReady(Box::new(f))
    }

    pub fn channel_not_ready(f: impl Fn(&PeerId) + Send + Sync + 'static) -> Self {
        Callback::ChannelNotReady(Box::new(f))
    }

    pub fn message(f: impl Fn(MeshMessage) + Send + Sync + 'static) -> Self {
        Callback::Message(Box::new(f))
    }

    pub fn event_name(&self) -> &'static str {
        match self {
            Callback::Ready(_) => "ready",
            Callback::ChannelReady(_) => "channel:ready",
            Callback::ChannelNotReady(_) => "channel:notready",
            Callback::Message(_) => "message",
        }
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Callback({})", self.event_name())
    }
}

/// One optional handler per event. Registering again replaces the handler.
#[derive(Default)]
pub struct Callbacks {
    ready: Option<ReadyHandler>,
    channel_ready: Option<ChannelHandler>,
    channel_not_ready: Option<ChannelHandler>,
    message: Option<MessageHandler>,
}

impl Callbacks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, callback: Callback) {
        match callback {
            Callback::Ready(f) => self.ready = Some(f),
            Callback::ChannelReady(f) => self.channel_ready = Some(f),
            Callback::ChannelNotReady(f) => self.channel_not_ready = Some(f),
            Callback::Message(f) => self.message = Some(f),
        }
    }

    pub fn fire_ready(&self) {
        if let Some(f) = &self.ready {
            f();
        }
    }

    pub fn fire_channel_ready(&self, peer_id: &PeerId) {
        if let Some(f) = &self.channel_ready {
            f(peer_id);
        }
    }

    pub fn fire_channel_not_ready(&self, peer_id: &PeerId) {
        if let Some(f) = &self.channel_not_ready {
            f(peer_id);
        }
    }

    pub fn fire_message(&self, message: MeshMessage) {
        if let Some(f) = &self.message {
            f(message);
        }
    }
}
