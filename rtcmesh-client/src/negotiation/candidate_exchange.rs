use crate::error::{SignalingError, TransportError};
use crate::registry::PeerConnection;
use crate::signaling::SignalingChannel;
use rtcmesh_core::{IceCandidate, PeerId, SignalData, SignalMessage};
use std::sync::Arc;
use tracing::debug;

/// Forwards local connectivity candidates to the relay and merges remote ones
/// into the matching transport.
///
/// By default only the first candidate gathered per connection is sent.
/// With `trickle_all` every candidate is forwarded.
pub struct CandidateExchange {
    signaling: Arc<dyn SignalingChannel>,
    trickle_all: bool,
}

impl CandidateExchange {
    pub fn new(signaling: Arc<dyn SignalingChannel>, trickle_all: bool) -> Self {
        Self {
            signaling,
            trickle_all,
        }
    }

    /// Returns whether a candidate was broadcast.
    pub async fn on_local_candidate_discovered(
        &self,
        local_id: &PeerId,
        conn: &mut PeerConnection,
        candidate: Option<IceCandidate>,
    ) -> Result<bool, SignalingError> {
        let Some(candidate) = candidate else {
            return Ok(false);
        };
        if conn.candidate_sent() && !self.trickle_all {
            return Ok(false);
        }

        let data = SignalData::Candidate {
            candidate: Some(candidate),
            id: local_id.clone(),
            to: Some(conn.peer_id().clone()),
        };
        self.signaling.emit(SignalMessage::Data(data)).await?;
        conn.mark_candidate_sent();
        debug!("Broadcasted candidate: {:?}", conn.peer_id());
        Ok(true)
    }

    /// Hands a remote candidate to the transport. The transport may reject it,
    /// e.g. when the remote description has not been applied yet.
    pub async fn on_remote_candidate_received(
        &self,
        candidate: Option<IceCandidate>,
        conn: &PeerConnection,
    ) -> Result<bool, TransportError> {
        let Some(candidate) = candidate else {
            return Ok(false);
        };

        conn.transport().add_ice_candidate(candidate).await?;
        debug!("Added received candidate {:?}", conn.peer_id());
        Ok(true)
    }
}
