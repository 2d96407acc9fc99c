use crate::transport::PeerTransport;
use rtcmesh_core::PeerId;
use std::fmt;
use std::sync::Arc;

/// Which side drives the offer/answer exchange for a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Initiator,
    Responder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NegotiationState {
    Created,
    OfferSent,
    AwaitingOffer,
    AnswerSent,
    AnswerReceived,
    Negotiated,
    Closed,
}

/// A connection towards one remote peer. The transport handle is owned
/// exclusively by this entry.
pub struct PeerConnection {
    peer_id: PeerId,
    role: Role,
    transport: Arc<dyn PeerTransport>,
    candidate_sent: bool,
    state: NegotiationState,
}

impl PeerConnection {
    pub(crate) fn new(peer_id: PeerId, role: Role, transport: Arc<dyn PeerTransport>) -> Self {
        Self {
            peer_id,
            role,
            transport,
            candidate_sent: false,
            state: NegotiationState::Created,
        }
    }

    pub fn peer_id(&self) -> &PeerId {
        &self.peer_id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn state(&self) -> NegotiationState {
        self.state
    }

    pub fn candidate_sent(&self) -> bool {
        self.candidate_sent
    }

    pub fn transport(&self) -> Arc<dyn PeerTransport> {
        self.transport.clone()
    }

    pub(crate) fn set_state(&mut self, state: NegotiationState) {
        self.state = state;
    }

    /// Flips `candidate_sent`. Returns `false` if it was already set.
    pub(crate) fn mark_candidate_sent(&mut self) -> bool {
        !std::mem::replace(&mut self.candidate_sent, true)
    }
}

impl fmt::Debug for PeerConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PeerConnection")
            .field("peer_id", &self.peer_id)
            .field("role", &self.role)
            .field("state", &self.state)
            .field("candidate_sent", &self.candidate_sent)
            .finish()
    }
}
