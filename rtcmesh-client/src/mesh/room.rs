use rtcmesh_core::{PeerId, RoomName};
use std::collections::BTreeSet;

/// Local view of the joined room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Room {
    name: RoomName,
    local_peer_id: Option<PeerId>,
    member_ids: BTreeSet<PeerId>,
    created: bool,
}

impl Room {
    pub fn new(name: RoomName) -> Self {
        Self {
            name,
            local_peer_id: None,
            member_ids: BTreeSet::new(),
            created: false,
        }
    }

    pub fn name(&self) -> &RoomName {
        &self.name
    }

    pub fn local_peer_id(&self) -> Option<&PeerId> {
        self.local_peer_id.as_ref()
    }

    /// Assigns the local id. Only the first assignment is kept; returns
    /// `false` for later attempts.
    pub fn set_local_peer_id(&mut self, id: PeerId) -> bool {
        if self.local_peer_id.is_some() {
            return false;
        }
        self.local_peer_id = Some(id);
        true
    }

    /// Remote members, never including the local id.
    pub fn member_ids(&self) -> &BTreeSet<PeerId> {
        &self.member_ids
    }

    pub fn add_member(&mut self, id: PeerId) -> bool {
        if self.local_peer_id.as_ref() == Some(&id) {
            return false;
        }
        self.member_ids.insert(id)
    }

    pub fn remove_member(&mut self, id: &PeerId) -> bool {
        self.member_ids.remove(id)
    }

    pub fn clear_members(&mut self) {
        self.member_ids.clear();
    }

    /// Whether the relay reported the room as created by us.
    pub fn created(&self) -> bool {
        self.created
    }

    pub fn mark_created(&mut self) {
        self.created = true;
    }
}
