use crate::error::NegotiationError;
use crate::registry::{NegotiationState, PeerConnection, Role};
use crate::signaling::SignalingChannel;
use rtcmesh_core::{PeerId, SessionDescription, SignalData, SignalMessage};
use std::sync::Arc;
use tracing::debug;

/// Drives the offer/answer exchange of each [`PeerConnection`].
///
/// Every step is awaited in order. A failing step returns early and leaves
/// the connection in the state it had reached.
pub struct OfferAnswerNegotiator {
    signaling: Arc<dyn SignalingChannel>,
}

impl OfferAnswerNegotiator {
    pub fn new(signaling: Arc<dyn SignalingChannel>) -> Self {
        Self { signaling }
    }

    /// Initiators offer right away; responders start waiting for an offer.
    pub async fn start(
        &self,
        local_id: &PeerId,
        conn: &mut PeerConnection,
    ) -> Result<(), NegotiationError> {
        match conn.role() {
            Role::Initiator => self.send_offer(local_id, conn).await,
            Role::Responder => {
                conn.set_state(NegotiationState::AwaitingOffer);
                Ok(())
            }
        }
    }

    async fn send_offer(
        &self,
        local_id: &PeerId,
        conn: &mut PeerConnection,
    ) -> Result<(), NegotiationError> {
        self.ensure_state(conn, "offer", |state| state == NegotiationState::Created)?;

        let transport = conn.transport();
        let offer = transport.create_offer().await?;
        debug!("Created offer for peer {:?}", conn.peer_id());

        self.emit_description(offer.clone(), local_id, conn.peer_id())
            .await?;
        transport.set_local_description(offer).await?;
        debug!("Set local description for {:?} and sent offer", conn.peer_id());

        conn.set_state(NegotiationState::OfferSent);
        Ok(())
    }

    /// Answers an inbound offer on a responder connection.
    pub async fn accept_offer(
        &self,
        local_id: &PeerId,
        conn: &mut PeerConnection,
        sdp: String,
    ) -> Result<(), NegotiationError> {
        self.ensure_state(conn, "offer", |state| {
            matches!(
                state,
                NegotiationState::Created | NegotiationState::AwaitingOffer
            )
        })?;
        if conn.role() != Role::Responder {
            return Err(self.unexpected(conn, "offer"));
        }

        let transport = conn.transport();
        transport
            .set_remote_description(SessionDescription::offer(sdp))
            .await?;
        debug!("Set remote description for peer {:?}", conn.peer_id());

        let answer = transport.create_answer().await?;
        self.emit_description(answer.clone(), local_id, conn.peer_id())
            .await?;
        transport.set_local_description(answer).await?;
        debug!("Set local description for {:?} and sent answer", conn.peer_id());

        conn.set_state(NegotiationState::AnswerSent);
        Ok(())
    }

    /// Applies the answer to an offer this side sent.
    pub async fn accept_answer(
        &self,
        conn: &mut PeerConnection,
        sdp: String,
    ) -> Result<(), NegotiationError> {
        self.ensure_state(conn, "answer", |state| state == NegotiationState::OfferSent)?;

        conn.set_state(NegotiationState::AnswerReceived);
        conn.transport()
            .set_remote_description(SessionDescription::answer(sdp))
            .await?;
        debug!("Set remote description for peer {:?}", conn.peer_id());

        conn.set_state(NegotiationState::Negotiated);
        Ok(())
    }

    /// The transport reported the connection as established.
    pub fn on_connected(&self, conn: &mut PeerConnection) {
        if conn.state() == NegotiationState::AnswerSent {
            conn.set_state(NegotiationState::Negotiated);
        }
    }

    async fn emit_description(
        &self,
        desc: SessionDescription,
        local_id: &PeerId,
        peer_id: &PeerId,
    ) -> Result<(), NegotiationError> {
        let data = SignalData::from_description(desc, local_id.clone(), peer_id.clone());
        self.signaling.emit(SignalMessage::Data(data)).await?;
        Ok(())
    }

    fn ensure_state(
        &self,
        conn: &PeerConnection,
        signal: &'static str,
        allowed: impl Fn(NegotiationState) -> bool,
    ) -> Result<(), NegotiationError> {
        if allowed(conn.state()) {
            Ok(())
        } else {
            Err(self.unexpected(conn, signal))
        }
    }

    fn unexpected(&self, conn: &PeerConnection, signal: &'static str) -> NegotiationError {
        NegotiationError::UnexpectedSignal {
            peer_id: conn.peer_id().clone(),
            state: conn.state(),
            signal,
        }
    }
}
