use crate::error::SignalingError;
use crate::signaling::{SignalEvent, SignalEventReceiver, SignalEventSender, SignalingChannel};
use async_trait::async_trait;
use rtcmesh_core::{PeerId, RoomDirectory, SignalMessage};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::mpsc;
use tracing::{debug, warn};

#[derive(Default)]
struct HubState {
    directory: RoomDirectory,
    clients: HashMap<PeerId, SignalEventSender>,
    log: Vec<(PeerId, SignalMessage)>,
}

/// In-process signaling relay with the same room semantics as `rtcmesh-relay`.
#[derive(Clone, Default)]
pub struct MemoryHub {
    state: Arc<Mutex<HubState>>,
}

impl MemoryHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Connects a client the relay will know as `id`. The receiver yields
    /// [`SignalEvent::Connected`] first.
    pub fn connect_as(&self, id: impl Into<PeerId>) -> (MemorySignaling, SignalEventReceiver) {
        let id = id.into();
        let (tx, rx) = mpsc::unbounded_channel();
        let _ = tx.send(SignalEvent::Connected);
        self.lock().clients.insert(id.clone(), tx);

        let signaling = MemorySignaling {
            id,
            hub: self.clone(),
            closed: AtomicBool::new(false),
        };
        (signaling, rx)
    }

    /// Drops the relay side of `id`'s connection, as if the server went away.
    pub fn disconnect(&self, id: &str) {
        let mut state = self.lock();
        let id = PeerId::from(id);
        state.directory.leave(&id);
        if let Some(tx) = state.clients.remove(&id) {
            let _ = tx.send(SignalEvent::Disconnected);
        }
    }

    /// Everything `id` emitted, in order.
    pub fn sent_by(&self, id: &str) -> Vec<SignalMessage> {
        let id = PeerId::from(id);
        self.lock()
            .log
            .iter()
            .filter(|(from, _)| *from == id)
            .map(|(_, msg)| msg.clone())
            .collect()
    }

    pub fn is_connected(&self, id: &str) -> bool {
        self.lock().clients.contains_key(&PeerId::from(id))
    }

    fn lock(&self) -> MutexGuard<'_, HubState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn route(&self, from: &PeerId, msg: SignalMessage) -> Result<(), SignalingError> {
        let mut state = self.lock();
        if !state.clients.contains_key(from) {
            return Err(SignalingError::Closed);
        }
        state.log.push((from.clone(), msg.clone()));

        match msg {
            SignalMessage::Join(room) => {
                let outcome = state.directory.join(from.clone(), room.clone());
                debug!("{:?} joined room {}", from, room);

                if outcome.created {
                    state.send(from, SignalMessage::Created(from.clone()));
                }
                state.send(
                    from,
                    SignalMessage::Joined {
                        id: from.clone(),
                        peers: outcome.existing.clone(),
                    },
                );
                for peer in &outcome.existing {
                    state.send(peer, SignalMessage::NewPeer(from.clone()));
                }
            }
            SignalMessage::Data(data) => {
                for peer in state.directory.recipients(from, data.recipient()) {
                    state.send(&peer, SignalMessage::Data(data.clone()));
                }
            }
            other => warn!("Ignoring client-side {:?} from {:?}", other, from),
        }
        Ok(())
    }

    fn leave(&self, id: &PeerId) {
        let mut state = self.lock();
        state.directory.leave(id);
        state.clients.remove(id);
    }
}

impl HubState {
    fn send(&self, to: &PeerId, msg: SignalMessage) {
        if let Some(tx) = self.clients.get(to) {
            let _ = tx.send(SignalEvent::Message(msg));
        }
    }
}

/// A client connection to a [`MemoryHub`].
pub struct MemorySignaling {
    id: PeerId,
    hub: MemoryHub,
    closed: AtomicBool,
}

impl MemorySignaling {
    pub fn id(&self) -> &PeerId {
        &self.id
    }
}

#[async_trait]
impl SignalingChannel for MemorySignaling {
    async fn emit(&self, msg: SignalMessage) -> Result<(), SignalingError> {
        if self.is_closed() {
            return Err(SignalingError::Closed);
        }
        self.hub.route(&self.id, msg)
    }

    async fn close(&self) -> Result<(), SignalingError> {
        if !self.closed.swap(true, Ordering::SeqCst) {
            self.hub.leave(&self.id);
        }
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}
