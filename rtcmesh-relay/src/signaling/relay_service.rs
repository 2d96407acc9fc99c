use axum::extract::ws::Message;
use dashmap::DashMap;
use rtcmesh_core::{PeerId, RoomDirectory, RoomName, SignalData, SignalMessage};
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, error, info, warn};

struct RelayInner {
    peers: DashMap<PeerId, mpsc::UnboundedSender<Message>>,
    directory: Mutex<RoomDirectory>,
}

/// Connected sockets and their room membership.
#[derive(Clone)]
pub struct RelayService {
    inner: Arc<RelayInner>,
}

impl Default for RelayService {
    fn default() -> Self {
        Self::new()
    }
}

impl RelayService {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RelayInner {
                peers: DashMap::new(),
                directory: Mutex::new(RoomDirectory::new()),
            }),
        }
    }

    pub fn add_peer(&self, peer_id: PeerId, tx: mpsc::UnboundedSender<Message>) {
        self.inner.peers.insert(peer_id, tx);
    }

    /// Forgets the socket and drops it from its room.
    pub async fn remove_peer(&self, peer_id: &PeerId) {
        self.inner.peers.remove(peer_id);
        if let Some(room) = self.inner.directory.lock().await.leave(peer_id) {
            debug!("Peer {:?} left room '{}'", peer_id, room);
        }
    }

    pub fn peer_count(&self) -> usize {
        self.inner.peers.len()
    }

    pub async fn members(&self, room: &RoomName) -> Vec<PeerId> {
        self.inner.directory.lock().await.members(room).to_vec()
    }

    /// Applies one inbound frame from `peer_id`.
    pub async fn handle_signal(&self, peer_id: &PeerId, msg: SignalMessage) {
        match msg {
            SignalMessage::Join(room) => self.join(peer_id, room).await,
            SignalMessage::Data(data) => self.forward(peer_id, data).await,
            other => warn!("Unexpected signal from {:?}: {:?}", peer_id, other),
        }
    }

    /// Replies and announcements are queued while the directory is locked, so
    /// every socket sees its own `joined` before any `new peer`.
    async fn join(&self, peer_id: &PeerId, room: RoomName) {
        let mut directory = self.inner.directory.lock().await;
        let outcome = directory.join(peer_id.clone(), room.clone());
        info!(
            "Peer {:?} joined room '{}' ({} already present)",
            peer_id,
            room,
            outcome.existing.len()
        );

        if outcome.created {
            self.send_signal(peer_id, SignalMessage::Created(peer_id.clone()));
        }
        self.send_signal(
            peer_id,
            SignalMessage::Joined {
                id: peer_id.clone(),
                peers: outcome.existing.clone(),
            },
        );
        for member in &outcome.existing {
            self.send_signal(member, SignalMessage::NewPeer(peer_id.clone()));
        }
        drop(directory);
    }

    async fn forward(&self, peer_id: &PeerId, data: SignalData) {
        let directory = self.inner.directory.lock().await;
        let recipients = directory.recipients(peer_id, data.recipient());

        if recipients.is_empty() {
            debug!("No recipient for {} from {:?}", data.kind(), peer_id);
            return;
        }
        for recipient in &recipients {
            self.send_signal(recipient, SignalMessage::Data(data.clone()));
        }
    }

    pub fn send_signal(&self, peer_id: &PeerId, msg: SignalMessage) {
        if let Some(peer) = self.inner.peers.get(peer_id) {
            match serde_json::to_string(&msg) {
                Ok(json) => {
                    if let Err(e) = peer.send(Message::Text(json.into())) {
                        error!("Failed to send WS message to {:?}: {:?}", peer_id, e);
                    }
                }
                Err(e) => error!("Failed to serialize signal message: {}", e),
            }
        } else {
            warn!(
                "Attempted to send signal to disconnected user {:?}",
                peer_id
            );
        }
    }
}
