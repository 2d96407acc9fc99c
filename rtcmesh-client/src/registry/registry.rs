use crate::error::RegistryError;
use crate::registry::{PeerConnection, Role};
use crate::transport::PeerTransport;
use rtcmesh_core::PeerId;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Owns every [`PeerConnection`] of the mesh, keyed by remote peer id.
#[derive(Debug, Default)]
pub struct PeerConnectionRegistry {
    connections: HashMap<PeerId, PeerConnection>,
}

impl PeerConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a connection towards `peer_id`. At most one connection may
    /// exist per peer.
    pub fn create(
        &mut self,
        peer_id: PeerId,
        role: Role,
        transport: Arc<dyn PeerTransport>,
    ) -> Result<&mut PeerConnection, RegistryError> {
        if self.connections.contains_key(&peer_id) {
            return Err(RegistryError::AlreadyExists(peer_id));
        }

        debug!("Created peer connection {:?} as {:?}", peer_id, role);
        let conn = PeerConnection::new(peer_id.clone(), role, transport);
        Ok(self.connections.entry(peer_id).or_insert(conn))
    }

    pub fn get(&self, peer_id: &PeerId) -> Result<&PeerConnection, RegistryError> {
        self.connections
            .get(peer_id)
            .ok_or_else(|| RegistryError::NotFound(peer_id.clone()))
    }

    pub fn get_mut(&mut self, peer_id: &PeerId) -> Result<&mut PeerConnection, RegistryError> {
        self.connections
            .get_mut(peer_id)
            .ok_or_else(|| RegistryError::NotFound(peer_id.clone()))
    }

    pub fn remove(&mut self, peer_id: &PeerId) -> Option<PeerConnection> {
        self.connections.remove(peer_id)
    }

    pub fn contains(&self, peer_id: &PeerId) -> bool {
        self.connections.contains_key(peer_id)
    }

    /// Remote peer ids, sorted.
    pub fn ids(&self) -> Vec<PeerId> {
        let mut ids: Vec<PeerId> = self.connections.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn iter(&self) -> impl Iterator<Item = &PeerConnection> {
        self.connections.values()
    }

    /// Empties the registry, handing every connection to the caller for teardown.
    pub fn drain(&mut self) -> Vec<PeerConnection> {
        self.connections.drain().map(|(_, conn)| conn).collect()
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
}
