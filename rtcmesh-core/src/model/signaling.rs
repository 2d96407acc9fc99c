use crate::model::peer::PeerId;
use crate::model::room::RoomName;
use crate::model::session::{IceCandidate, SdpKind, SessionDescription};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IceServerConfig {
    pub urls: Vec<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub credential: Option<String>,
}

/// Events exchanged with the signaling relay.
///
/// Frames are adjacently tagged: `{"op": "joined", "d": {"id": .., "peers": [..]}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", content = "d")]
pub enum SignalMessage {
    /// Client asks to join (or create) a room.
    #[serde(rename = "join")]
    Join(RoomName),

    /// The room did not exist and was created for this client.
    #[serde(rename = "created")]
    Created(PeerId),

    /// Join acknowledged. `id` is the local peer id, `peers` the members already present.
    #[serde(rename = "joined")]
    Joined { id: PeerId, peers: Vec<PeerId> },

    /// Another peer joined after us.
    #[serde(rename = "new peer")]
    NewPeer(PeerId),

    /// Negotiation payload routed between two peers.
    #[serde(rename = "data")]
    Data(SignalData),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SignalData {
    Offer {
        sdp: String,
        from: PeerId,
        to: PeerId,
    },
    Answer {
        sdp: String,
        from: PeerId,
        to: PeerId,
    },
    Candidate {
        candidate: Option<IceCandidate>,
        /// Sender of the candidate.
        id: PeerId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        to: Option<PeerId>,
    },
    #[serde(other)]
    Unknown,
}

impl SignalData {
    /// Stamps a local description with its sender and recipient.
    pub fn from_description(desc: SessionDescription, from: PeerId, to: PeerId) -> Self {
        match desc.kind {
            SdpKind::Offer => SignalData::Offer {
                sdp: desc.sdp,
                from,
                to,
            },
            SdpKind::Answer => SignalData::Answer {
                sdp: desc.sdp,
                from,
                to,
            },
        }
    }

    pub fn recipient(&self) -> Option<&PeerId> {
        match self {
            SignalData::Offer { to, .. } | SignalData::Answer { to, .. } => Some(to),
            SignalData::Candidate { to, .. } => to.as_ref(),
            SignalData::Unknown => None,
        }
    }

    pub fn sender(&self) -> Option<&PeerId> {
        match self {
            SignalData::Offer { from, .. } | SignalData::Answer { from, .. } => Some(from),
            SignalData::Candidate { id, .. } => Some(id),
            SignalData::Unknown => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            SignalData::Offer { .. } => "offer",
            SignalData::Answer { .. } => "answer",
            SignalData::Candidate { .. } => "candidate",
            SignalData::Unknown => "unknown",
        }
    }
}
