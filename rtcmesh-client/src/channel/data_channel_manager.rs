use crate::config::ChannelOptions;
use crate::error::{MeshError, TransportError};
use crate::mesh::{Callbacks, MeshMessage};
use crate::registry::PeerConnection;
use crate::transport::{ChannelHandle, ChannelKey, ChannelState, EventSender};
use rtcmesh_core::PeerId;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// A data channel the mesh listens to.
pub struct TrackedChannel {
    key: ChannelKey,
    /// Id of the owning connection in the registry.
    owner: PeerId,
    label: String,
    ready_state: ChannelState,
    handle: Arc<dyn ChannelHandle>,
}

impl TrackedChannel {
    pub fn key(&self) -> ChannelKey {
        self.key
    }

    pub fn owner(&self) -> &PeerId {
        &self.owner
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn ready_state(&self) -> ChannelState {
        self.ready_state
    }
}

/// Tracks every data channel of the mesh and routes their events.
pub struct DataChannelManager {
    channels: BTreeMap<ChannelKey, TrackedChannel>,
    next_key: u64,
    events: EventSender,
}

impl DataChannelManager {
    /// Channel events are reported through `events`.
    pub fn new(events: EventSender) -> Self {
        Self {
            channels: BTreeMap::new(),
            next_key: 0,
            events,
        }
    }

    /// Creates the local channel of an initiator connection.
    pub async fn attach_local(
        &mut self,
        conn: &PeerConnection,
        label: &str,
        options: &ChannelOptions,
    ) -> Result<ChannelKey, TransportError> {
        let handle = conn.transport().create_data_channel(label, options).await?;
        debug!("Created data channel with peer {:?}", conn.peer_id());
        Ok(self.track(conn.peer_id().clone(), handle))
    }

    /// Tracks a channel the remote side of `conn` opened.
    pub fn attach_remote(
        &mut self,
        conn: &PeerConnection,
        handle: Arc<dyn ChannelHandle>,
    ) -> ChannelKey {
        debug!(
            "Remote data channel '{}' from peer {:?}",
            handle.label(),
            conn.peer_id()
        );
        self.track(conn.peer_id().clone(), handle)
    }

    fn track(&mut self, owner: PeerId, handle: Arc<dyn ChannelHandle>) -> ChannelKey {
        self.next_key += 1;
        let key = ChannelKey(self.next_key);

        let channel = TrackedChannel {
            key,
            owner,
            label: handle.label(),
            ready_state: ChannelState::Connecting,
            handle: handle.clone(),
        };
        self.channels.insert(key, channel);

        handle.bind(key, self.events.clone());
        debug!("Set the data channel callback.");
        key
    }

    /// Applies a reported state. Every report fires a callback: `Open`
    /// fires `channel:ready`, anything else `channel:notready`.
    ///
    /// Returns `false` for channels that are no longer tracked.
    pub fn on_state_change(
        &mut self,
        key: ChannelKey,
        state: ChannelState,
        callbacks: &Callbacks,
    ) -> bool {
        let Some(channel) = self.channels.get_mut(&key) else {
            return false;
        };

        channel.ready_state = state;
        debug!("Channel to {:?} is {:?}", channel.owner, state);
        match state {
            ChannelState::Open => callbacks.fire_channel_ready(&channel.owner),
            _ => callbacks.fire_channel_not_ready(&channel.owner),
        }
        true
    }

    /// Fires `message` with the owner of the channel as sender.
    pub fn on_message(&self, key: ChannelKey, text: String, callbacks: &Callbacks) -> bool {
        let Some(channel) = self.channels.get(&key) else {
            return false;
        };

        debug!("[Message] {}", text);
        callbacks.fire_message(MeshMessage {
            text,
            sender: channel.owner.clone(),
        });
        true
    }

    /// Sends `text` on every tracked channel, whatever its state.
    ///
    /// All channels are attempted. Returns the number of successful sends, or
    /// the first failure.
    pub async fn send_message(&self, text: &str) -> Result<usize, MeshError> {
        let mut sent = 0;
        let mut first_error = None;

        for channel in self.channels.values() {
            match channel.handle.send_text(text).await {
                Ok(()) => sent += 1,
                Err(source) => {
                    warn!("Failed to send to {:?}: {}", channel.owner, source);
                    first_error.get_or_insert(MeshError::Send {
                        peer_id: channel.owner.clone(),
                        source,
                    });
                }
            }
        }

        debug!("Sent message on {} of {} channels", sent, self.channels.len());
        match first_error {
            Some(e) => Err(e),
            None => Ok(sent),
        }
    }

    /// Stops tracking the channels owned by `owner`. Channels that were open
    /// report `channel:notready`.
    pub fn detach_owned_by(&mut self, owner: &PeerId, callbacks: &Callbacks) -> usize {
        let keys: Vec<ChannelKey> = self
            .channels
            .values()
            .filter(|c| &c.owner == owner)
            .map(|c| c.key)
            .collect();

        for key in &keys {
            if let Some(channel) = self.channels.remove(key)
                && channel.ready_state == ChannelState::Open
            {
                callbacks.fire_channel_not_ready(owner);
            }
        }
        keys.len()
    }

    pub fn clear(&mut self) {
        self.channels.clear();
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TrackedChannel> {
        self.channels.values()
    }
}
