use crate::config::{ChannelOptions, RtcOptions};
use crate::error::TransportError;
use crate::transport::{
    ChannelHandle, ChannelKey, ChannelState, ConnectionState, EventSender, PeerTransport,
    TransportEngine, TransportEvent,
};
use async_trait::async_trait;
use rtcmesh_core::{IceCandidate, PeerId, SdpKind, SessionDescription};
use std::sync::Arc;
use tracing::{debug, info, warn};
use webrtc::api::APIBuilder;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::MediaEngine;
use webrtc::data_channel::RTCDataChannel;
use webrtc::data_channel::data_channel_init::RTCDataChannelInit;
use webrtc::data_channel::data_channel_message::DataChannelMessage;
use webrtc::data_channel::data_channel_state::RTCDataChannelState;
use webrtc::ice_transport::ice_candidate::{RTCIceCandidate, RTCIceCandidateInit};
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;

impl From<webrtc::Error> for TransportError {
    fn from(e: webrtc::Error) -> Self {
        TransportError::Engine(e.to_string())
    }
}

/// [`TransportEngine`] backed by the `webrtc` crate.
#[derive(Clone)]
pub struct WebRtcEngine {
    options: RtcOptions,
}

impl WebRtcEngine {
    pub fn new(options: RtcOptions) -> Self {
        Self { options }
    }

    fn rtc_configuration(&self) -> RTCConfiguration {
        let ice_servers = self
            .options
            .ice_servers
            .iter()
            .map(|server| RTCIceServer {
                urls: server.urls.clone(),
                username: server.username.clone().unwrap_or_default(),
                credential: server.credential.clone().unwrap_or_default(),
            })
            .collect();

        RTCConfiguration {
            ice_servers,
            ..Default::default()
        }
    }
}

#[async_trait]
impl TransportEngine for WebRtcEngine {
    async fn create_connection(
        &self,
        peer_id: &PeerId,
        events: EventSender,
    ) -> Result<Arc<dyn PeerTransport>, TransportError> {
        let connection =
            WebRtcConnection::new(peer_id.clone(), self.rtc_configuration(), events).await?;
        Ok(Arc::new(connection))
    }
}

pub struct WebRtcConnection {
    peer_id: PeerId,
    peer_connection: Arc<RTCPeerConnection>,
}

impl WebRtcConnection {
    async fn new(
        peer_id: PeerId,
        rtc_config: RTCConfiguration,
        events: EventSender,
    ) -> Result<Self, TransportError> {
        // Codecs are registered even though only data channels are used.
        let mut m = MediaEngine::default();
        m.register_default_codecs()?;
        let registry = register_default_interceptors(Registry::new(), &mut m)?;

        let api = APIBuilder::new()
            .with_media_engine(m)
            .with_interceptor_registry(registry)
            .build();

        let peer_connection = Arc::new(api.new_peer_connection(rtc_config).await?);

        let state_tx = events.clone();
        let pid_state = peer_id.clone();
        peer_connection.on_peer_connection_state_change(Box::new(
            move |s: RTCPeerConnectionState| {
                let tx = state_tx.clone();
                let pid = pid_state.clone();

                Box::pin(async move {
                    info!("Peer connection state changed for {:?}: {:?}", pid, s);
                    let state = match s {
                        RTCPeerConnectionState::Connecting => ConnectionState::Connecting,
                        RTCPeerConnectionState::Connected => ConnectionState::Connected,
                        RTCPeerConnectionState::Disconnected => ConnectionState::Disconnected,
                        RTCPeerConnectionState::Failed => ConnectionState::Failed,
                        RTCPeerConnectionState::Closed => ConnectionState::Closed,
                        _ => ConnectionState::New,
                    };
                    let _ = tx.send(TransportEvent::ConnectionStateChanged {
                        peer_id: pid,
                        state,
                    });
                })
            },
        ));

        let ice_tx = events.clone();
        let pid_ice = peer_id.clone();
        peer_connection.on_ice_candidate(Box::new(move |c: Option<RTCIceCandidate>| {
            let tx = ice_tx.clone();
            let pid = pid_ice.clone();

            Box::pin(async move {
                let candidate = match c {
                    Some(c) => match c.to_json() {
                        Ok(init) => Some(IceCandidate {
                            candidate: init.candidate,
                            sdp_mid: init.sdp_mid,
                            sdp_mline_index: init.sdp_mline_index,
                        }),
                        Err(e) => {
                            warn!("Failed to serialize ICE candidate for {:?}: {}", pid, e);
                            return;
                        }
                    },
                    None => None,
                };
                let _ = tx.send(TransportEvent::CandidateDiscovered {
                    peer_id: pid,
                    candidate,
                });
            })
        }));

        let dc_tx = events.clone();
        let pid_dc = peer_id.clone();
        peer_connection.on_data_channel(Box::new(move |dc: Arc<RTCDataChannel>| {
            let tx = dc_tx.clone();
            let pid = pid_dc.clone();

            Box::pin(async move {
                debug!("Remote data channel '{}' announced by {:?}", dc.label(), pid);
                let _ = tx.send(TransportEvent::DataChannelAnnounced {
                    peer_id: pid,
                    channel: Arc::new(WebRtcChannel::new(dc)),
                });
            })
        }));

        Ok(Self {
            peer_id,
            peer_connection,
        })
    }

    pub fn peer_id(&self) -> &PeerId {
        &self.peer_id
    }
}

fn to_rtc_description(desc: SessionDescription) -> Result<RTCSessionDescription, TransportError> {
    let parsed = match desc.kind {
        SdpKind::Offer => RTCSessionDescription::offer(desc.sdp),
        SdpKind::Answer => RTCSessionDescription::answer(desc.sdp),
    };
    parsed.map_err(|e| TransportError::InvalidDescription(e.to_string()))
}

#[async_trait]
impl PeerTransport for WebRtcConnection {
    async fn create_data_channel(
        &self,
        label: &str,
        options: &ChannelOptions,
    ) -> Result<Arc<dyn ChannelHandle>, TransportError> {
        let init = RTCDataChannelInit {
            ordered: options.ordered,
            max_retransmits: options.max_retransmits,
            max_packet_life_time: options.max_packet_life_time,
            protocol: options.protocol.clone(),
            ..Default::default()
        };
        let dc = self
            .peer_connection
            .create_data_channel(label, Some(init))
            .await?;
        Ok(Arc::new(WebRtcChannel::new(dc)))
    }

    async fn create_offer(&self) -> Result<SessionDescription, TransportError> {
        let offer = self.peer_connection.create_offer(None).await?;
        Ok(SessionDescription::offer(offer.sdp))
    }

    async fn create_answer(&self) -> Result<SessionDescription, TransportError> {
        let answer = self.peer_connection.create_answer(None).await?;
        Ok(SessionDescription::answer(answer.sdp))
    }

    async fn set_local_description(&self, desc: SessionDescription) -> Result<(), TransportError> {
        self.peer_connection
            .set_local_description(to_rtc_description(desc)?)
            .await?;
        Ok(())
    }

    async fn set_remote_description(
        &self,
        desc: SessionDescription,
    ) -> Result<(), TransportError> {
        self.peer_connection
            .set_remote_description(to_rtc_description(desc)?)
            .await?;
        Ok(())
    }

    async fn add_ice_candidate(&self, candidate: IceCandidate) -> Result<(), TransportError> {
        let init = RTCIceCandidateInit {
            candidate: candidate.candidate,
            sdp_mid: candidate.sdp_mid,
            sdp_mline_index: candidate.sdp_mline_index,
            ..Default::default()
        };
        self.peer_connection.add_ice_candidate(init).await?;
        Ok(())
    }

    async fn close(&self) -> Result<(), TransportError> {
        self.peer_connection.close().await?;
        Ok(())
    }
}

pub struct WebRtcChannel {
    inner: Arc<RTCDataChannel>,
}

impl WebRtcChannel {
    pub fn new(inner: Arc<RTCDataChannel>) -> Self {
        Self { inner }
    }
}

fn channel_state(state: RTCDataChannelState) -> ChannelState {
    match state {
        RTCDataChannelState::Open => ChannelState::Open,
        RTCDataChannelState::Closing | RTCDataChannelState::Closed => ChannelState::Closed,
        _ => ChannelState::Connecting,
    }
}

#[async_trait]
impl ChannelHandle for WebRtcChannel {
    fn label(&self) -> String {
        self.inner.label().to_owned()
    }

    fn ready_state(&self) -> ChannelState {
        channel_state(self.inner.ready_state())
    }

    fn bind(&self, key: ChannelKey, events: EventSender) {
        // on_open fires right away when the channel is already open.
        let open_tx = events.clone();
        self.inner.on_open(Box::new(move || {
            let tx = open_tx.clone();
            Box::pin(async move {
                let _ = tx.send(TransportEvent::ChannelStateChanged {
                    key,
                    state: ChannelState::Open,
                });
            })
        }));

        let close_tx = events.clone();
        self.inner.on_close(Box::new(move || {
            let tx = close_tx.clone();
            Box::pin(async move {
                let _ = tx.send(TransportEvent::ChannelStateChanged {
                    key,
                    state: ChannelState::Closed,
                });
            })
        }));

        let msg_tx = events;
        self.inner.on_message(Box::new(move |msg: DataChannelMessage| {
            let tx = msg_tx.clone();
            Box::pin(async move {
                let text = String::from_utf8_lossy(&msg.data).into_owned();
                let _ = tx.send(TransportEvent::ChannelMessage { key, text });
            })
        }));
    }

    async fn send_text(&self, text: &str) -> Result<(), TransportError> {
        if self.ready_state() != ChannelState::Open {
            return Err(TransportError::ChannelNotOpen);
        }
        self.inner.send_text(text.to_owned()).await?;
        Ok(())
    }

    async fn close(&self) -> Result<(), TransportError> {
        self.inner.close().await?;
        Ok(())
    }
}
