use crate::model::{PeerId, RoomName};
use std::collections::HashMap;

/// Result of admitting a peer into a room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinOutcome {
    /// The room did not exist before this join.
    pub created: bool,
    /// Members that were already present, in join order.
    pub existing: Vec<PeerId>,
}

/// Room membership bookkeeping shared by every relay implementation.
#[derive(Debug, Default)]
pub struct RoomDirectory {
    rooms: HashMap<RoomName, Vec<PeerId>>,
    membership: HashMap<PeerId, RoomName>,
}

impl RoomDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `peer` to `room`. A peer belongs to at most one room, so a previous
    /// membership is dropped first.
    pub fn join(&mut self, peer: PeerId, room: RoomName) -> JoinOutcome {
        self.leave(&peer);

        let members = self.rooms.entry(room.clone()).or_default();
        let outcome = JoinOutcome {
            created: members.is_empty(),
            existing: members.clone(),
        };
        members.push(peer.clone());
        self.membership.insert(peer, room);
        outcome
    }

    /// Removes `peer` from its room. Empty rooms are forgotten.
    pub fn leave(&mut self, peer: &PeerId) -> Option<RoomName> {
        let room = self.membership.remove(peer)?;
        if let Some(members) = self.rooms.get_mut(&room) {
            members.retain(|p| p != peer);
            if members.is_empty() {
                self.rooms.remove(&room);
            }
        }
        Some(room)
    }

    pub fn room_of(&self, peer: &PeerId) -> Option<&RoomName> {
        self.membership.get(peer)
    }

    pub fn members(&self, room: &RoomName) -> &[PeerId] {
        self.rooms.get(room).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Peers that should receive a payload sent by `from`.
    ///
    /// Addressed payloads go to the recipient only if it shares the sender's
    /// room; unaddressed payloads go to every other member of that room.
    pub fn recipients(&self, from: &PeerId, to: Option<&PeerId>) -> Vec<PeerId> {
        let Some(room) = self.membership.get(from) else {
            return Vec::new();
        };
        let members = self.members(room);

        match to {
            Some(to) if to != from && members.contains(to) => vec![to.clone()],
            Some(_) => Vec::new(),
            None => members.iter().filter(|p| *p != from).cloned().collect(),
        }
    }
}
