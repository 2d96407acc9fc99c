use crate::channel::DataChannelManager;
use crate::config::MeshConfig;
use crate::error::MeshError;
use crate::mesh::{
    Callback, Callbacks, ChannelSummary, MeshCommand, MeshHandle, MeshSnapshot, PeerSummary, Room,
};
use crate::negotiation::{CandidateExchange, OfferAnswerNegotiator};
use crate::registry::{NegotiationState, PeerConnectionRegistry, Role};
use crate::signaling::{SignalEvent, SignalEventReceiver, SignalingChannel, WsSignaling};
use crate::transport::{
    ConnectionState, EventReceiver, EventSender, TransportEngine, TransportEvent, WebRtcEngine,
};
use rtcmesh_core::{PeerId, RoomName, SignalData, SignalMessage};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// A room-scoped mesh of peer connections, before it is started.
///
/// Handlers registered here are in place before the first signaling event is
/// processed.
pub struct Mesh {
    config: MeshConfig,
    engine: Arc<dyn TransportEngine>,
    signaling: Arc<dyn SignalingChannel>,
    signal_rx: SignalEventReceiver,
    callbacks: Callbacks,
}

impl Mesh {
    pub fn new(
        config: MeshConfig,
        engine: Arc<dyn TransportEngine>,
        signaling: Arc<dyn SignalingChannel>,
        signal_rx: SignalEventReceiver,
    ) -> Self {
        if config.debug_mode {
            debug!("debug enabled");
        }

        Self {
            config,
            engine,
            signaling,
            signal_rx,
            callbacks: Callbacks::new(),
        }
    }

    /// Connects to `config.signalling_server` over WebSocket and uses the
    /// `webrtc` engine configured by `config.rtc_opts`.
    pub async fn connect(config: MeshConfig) -> Result<Self, MeshError> {
        let engine = Arc::new(WebRtcEngine::new(config.rtc_opts.clone()));
        let (signaling, signal_rx) = WsSignaling::connect(&config.signalling_server).await?;
        Ok(Self::new(config, engine, Arc::new(signaling), signal_rx))
    }

    /// Registers a handler, replacing any previous handler for the same event.
    pub fn on(&mut self, callback: Callback) -> &mut Self {
        self.callbacks.register(callback);
        self
    }

    /// Spawns the mesh task. It runs until [`MeshHandle::close`] is called or
    /// every handle is dropped.
    pub fn start(self) -> MeshHandle {
        let (command_tx, command_rx) = mpsc::channel(100);
        let (transport_tx, transport_rx) = mpsc::unbounded_channel();

        let actor = MeshActor {
            room: Room::new(RoomName::from(self.config.room_name.as_str())),
            registry: PeerConnectionRegistry::new(),
            channels: DataChannelManager::new(transport_tx.clone()),
            negotiator: OfferAnswerNegotiator::new(self.signaling.clone()),
            candidates: CandidateExchange::new(
                self.signaling.clone(),
                self.config.trickle_all_candidates,
            ),
            callbacks: self.callbacks,
            config: self.config,
            engine: self.engine,
            signaling: self.signaling,
            signaling_open: true,
            command_rx,
            signal_rx: self.signal_rx,
            transport_rx,
            transport_tx,
        };
        tokio::spawn(actor.run());

        MeshHandle::new(command_tx)
    }
}

struct MeshActor {
    config: MeshConfig,
    room: Room,
    registry: PeerConnectionRegistry,
    channels: DataChannelManager,
    callbacks: Callbacks,
    negotiator: OfferAnswerNegotiator,
    candidates: CandidateExchange,
    engine: Arc<dyn TransportEngine>,
    signaling: Arc<dyn SignalingChannel>,
    signaling_open: bool,
    command_rx: mpsc::Receiver<MeshCommand>,
    signal_rx: SignalEventReceiver,
    transport_rx: EventReceiver,
    transport_tx: EventSender,
}

impl MeshActor {
    async fn run(mut self) {
        info!("Mesh event loop started for room {}", self.room.name());

        loop {
            tokio::select! {
                biased;

                cmd = self.command_rx.recv() => {
                    match cmd {
                        Some(MeshCommand::Close { reply }) => {
                            let result = self.shutdown().await;
                            let _ = reply.send(result);
                            break;
                        }
                        Some(c) => self.handle_command(c).await,
                        None => {
                            info!("All mesh handles dropped. Closing.");
                            if let Err(e) = self.shutdown().await {
                                warn!("Failed to close signaling: {}", e);
                            }
                            break;
                        }
                    }
                }

                evt = self.signal_rx.recv(), if self.signaling_open => {
                    match evt {
                        Some(e) => self.handle_signal(e).await,
                        None => {
                            debug!("Signaling event stream ended");
                            self.signaling_open = false;
                        }
                    }
                }

                evt = self.transport_rx.recv() => {
                    match evt {
                        Some(e) => self.handle_transport_event(e).await,
                        None => {
                            warn!("Transport channel closed unexpectedly");
                            break;
                        }
                    }
                }
            }
        }

        info!("Mesh event loop finished");
    }

    async fn handle_command(&mut self, cmd: MeshCommand) {
        match cmd {
            MeshCommand::On(callback) => {
                debug!("Registered handler for '{}'", callback.event_name());
                self.callbacks.register(callback);
            }

            MeshCommand::SendMessage { text, reply } => {
                let result = self.channels.send_message(&text).await;
                let _ = reply.send(result);
            }

            MeshCommand::Snapshot { reply } => {
                let _ = reply.send(self.snapshot());
            }

            // Handled by the event loop.
            MeshCommand::Close { reply } => {
                let _ = reply.send(Err(MeshError::Closed));
            }
        }
    }

    async fn handle_signal(&mut self, event: SignalEvent) {
        match event {
            SignalEvent::Connected => {
                let join = SignalMessage::Join(self.room.name().clone());
                match self.signaling.emit(join).await {
                    Ok(()) => debug!("Sent request to join room {}", self.room.name()),
                    Err(e) => error!("Failed to request join of {}: {}", self.room.name(), e),
                }
            }

            SignalEvent::Disconnected => {
                info!("Signaling disconnected; peer connections are left as they are");
                self.signaling_open = false;
            }

            SignalEvent::Message(msg) => self.handle_message(msg).await,
        }
    }

    async fn handle_message(&mut self, msg: SignalMessage) {
        match msg {
            SignalMessage::Created(_) => {
                debug!("Created new room {}", self.room.name());
                self.room.mark_created();
            }

            SignalMessage::Joined { id, peers } => {
                if !self.room.set_local_peer_id(id.clone()) {
                    warn!("Ignoring repeated join acknowledgment with id {:?}", id);
                    return;
                }

                for peer in peers.into_iter().filter(|p| *p != id) {
                    self.room.add_member(peer.clone());
                    self.create_connection(peer, Role::Responder).await;
                }

                info!("Successfully joined room {} as {:?}", self.room.name(), id);
                self.callbacks.fire_ready();
            }

            SignalMessage::NewPeer(peer_id) => {
                if self.room.local_peer_id().is_none_or(|local| *local == peer_id) {
                    warn!("Ignoring new peer announcement for {:?}", peer_id);
                    return;
                }

                debug!("New peer {:?} has joined the room", peer_id);
                self.room.add_member(peer_id.clone());
                self.create_connection(peer_id, Role::Initiator).await;
            }

            SignalMessage::Data(data) => self.handle_data(data).await,

            SignalMessage::Join(room) => {
                warn!("Unexpected join request for room {} from relay", room);
            }
        }
    }

    /// Registers a connection towards `peer_id` and starts negotiating.
    /// Initiators get their data channel before the offer is made.
    async fn create_connection(&mut self, peer_id: PeerId, role: Role) {
        let Some(local_id) = self.room.local_peer_id().cloned() else {
            return;
        };
        if self.registry.contains(&peer_id) {
            warn!("Connection to {:?} already exists, keeping it", peer_id);
            return;
        }

        let transport = match self
            .engine
            .create_connection(&peer_id, self.transport_tx.clone())
            .await
        {
            Ok(t) => t,
            Err(e) => {
                error!("Failed to create transport for {:?}: {}", peer_id, e);
                return;
            }
        };

        let conn = match self.registry.create(peer_id.clone(), role, transport.clone()) {
            Ok(conn) => conn,
            Err(e) => {
                warn!("{}", e);
                if let Err(e) = transport.close().await {
                    warn!("Failed to close transport for {:?}: {}", peer_id, e);
                }
                return;
            }
        };

        if role == Role::Initiator {
            let label = self.config.channel_name.as_str();
            if let Err(e) = self
                .channels
                .attach_local(conn, label, &self.config.channel_opts)
                .await
            {
                error!("Failed to create data channel for {:?}: {}", peer_id, e);
                return;
            }
        }

        if let Err(e) = self.negotiator.start(&local_id, conn).await {
            error!("Negotiation with {:?} failed: {}", peer_id, e);
        }
    }

    async fn handle_data(&mut self, data: SignalData) {
        let Some(local_id) = self.room.local_peer_id().cloned() else {
            debug!("Dropping {} received before join", data.kind());
            return;
        };

        match data {
            SignalData::Offer { sdp, from, to } => {
                if to != local_id {
                    debug!("Ignoring offer from {:?} addressed to {:?}", from, to);
                    return;
                }
                debug!("Got an offer from {:?}", from);

                if !self.registry.contains(&from) {
                    self.room.add_member(from.clone());
                    self.create_connection(from.clone(), Role::Responder).await;
                }
                let Ok(conn) = self.registry.get_mut(&from) else {
                    return;
                };
                if let Err(e) = self.negotiator.accept_offer(&local_id, conn, sdp).await {
                    error!("Failed to answer offer from {:?}: {}", from, e);
                }
            }

            SignalData::Answer { sdp, from, to } => {
                if to != local_id {
                    debug!("Ignoring answer from {:?} addressed to {:?}", from, to);
                    return;
                }
                debug!("Got an answer from {:?}", from);

                let Ok(conn) = self.registry.get_mut(&from) else {
                    warn!("Dropping answer from unknown peer {:?}", from);
                    return;
                };
                if let Err(e) = self.negotiator.accept_answer(conn, sdp).await {
                    error!("Failed to apply answer from {:?}: {}", from, e);
                }
            }

            SignalData::Candidate { candidate, id, to } => {
                if to.as_ref().is_some_and(|to| *to != local_id) {
                    return;
                }
                debug!("Got a candidate: {:?}", id);

                let Ok(conn) = self.registry.get(&id) else {
                    warn!("Dropping candidate from unknown peer {:?}", id);
                    return;
                };
                if let Err(e) = self
                    .candidates
                    .on_remote_candidate_received(candidate, conn)
                    .await
                {
                    warn!("Failed to add ICE candidate for {:?}: {}", id, e);
                }
            }

            SignalData::Unknown => warn!("Got an unexpected data type"),
        }
    }

    async fn handle_transport_event(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::CandidateDiscovered { peer_id, candidate } => {
                let Some(local_id) = self.room.local_peer_id().cloned() else {
                    return;
                };
                let Ok(conn) = self.registry.get_mut(&peer_id) else {
                    return;
                };
                if let Err(e) = self
                    .candidates
                    .on_local_candidate_discovered(&local_id, conn, candidate)
                    .await
                {
                    error!("Failed to send candidate to {:?}: {}", peer_id, e);
                }
            }

            TransportEvent::DataChannelAnnounced { peer_id, channel } => {
                let Ok(conn) = self.registry.get(&peer_id) else {
                    debug!("Ignoring data channel from untracked peer {:?}", peer_id);
                    return;
                };
                self.channels.attach_remote(conn, channel);
            }

            TransportEvent::ConnectionStateChanged { peer_id, state } => {
                debug!("Connection to {:?} is {:?}", peer_id, state);
                if state == ConnectionState::Connected {
                    if let Ok(conn) = self.registry.get_mut(&peer_id) {
                        self.negotiator.on_connected(conn);
                    }
                } else if state.is_terminal() {
                    self.remove_peer(&peer_id).await;
                }
            }

            TransportEvent::ChannelStateChanged { key, state } => {
                self.channels.on_state_change(key, state, &self.callbacks);
            }

            TransportEvent::ChannelMessage { key, text } => {
                self.channels.on_message(key, text, &self.callbacks);
            }
        }
    }

    async fn remove_peer(&mut self, peer_id: &PeerId) {
        let Some(mut conn) = self.registry.remove(peer_id) else {
            return;
        };

        conn.set_state(NegotiationState::Closed);
        self.channels.detach_owned_by(peer_id, &self.callbacks);
        self.room.remove_member(peer_id);

        if let Err(e) = conn.transport().close().await {
            warn!("Failed to close transport for {:?}: {}", peer_id, e);
        }
        info!("Peer {:?} left the mesh", peer_id);
    }

    async fn shutdown(&mut self) -> Result<(), MeshError> {
        for mut conn in self.registry.drain() {
            conn.set_state(NegotiationState::Closed);
            if let Err(e) = conn.transport().close().await {
                warn!("Failed to close transport for {:?}: {}", conn.peer_id(), e);
            }
        }
        self.channels.clear();
        self.room.clear_members();

        self.signaling_open = false;
        self.signaling.close().await?;
        info!("Closed mesh for room {}", self.room.name());
        Ok(())
    }

    fn snapshot(&self) -> MeshSnapshot {
        let mut peers: Vec<PeerSummary> = self
            .registry
            .iter()
            .map(|conn| PeerSummary {
                peer_id: conn.peer_id().clone(),
                role: conn.role(),
                state: conn.state(),
                candidate_sent: conn.candidate_sent(),
            })
            .collect();
        peers.sort_by(|a, b| a.peer_id.cmp(&b.peer_id));

        MeshSnapshot {
            room: self.room.name().clone(),
            local_peer_id: self.room.local_peer_id().cloned(),
            members: self.room.member_ids().iter().cloned().collect(),
            peers,
            channels: self
                .channels
                .iter()
                .map(|c| ChannelSummary {
                    owner: c.owner().clone(),
                    label: c.label().to_owned(),
                    ready_state: c.ready_state(),
                })
                .collect(),
        }
    }
}
