//! In-memory transport engine.
//!
//! Every [`MockEngine`] created from the same [`MockNetwork`] can reach the
//! others. Two connections `a -> b` and `b -> a` link once both hold a local
//! and a remote description: channels created on either side are announced to
//! the other side, every channel opens and both report `Connected`.

use crate::config::ChannelOptions;
use crate::error::TransportError;
use crate::transport::{
    ChannelHandle, ChannelKey, ChannelState, ConnectionState, EventSender, PeerTransport,
    TransportEngine, TransportEvent,
};
use async_trait::async_trait;
use rtcmesh_core::{IceCandidate, PeerId, SdpKind, SessionDescription};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use tracing::debug;

const OFFER_PREFIX: &str = "mock-offer:";
const ANSWER_PREFIX: &str = "mock-answer:";

type Link = (PeerId, PeerId);

/// A text sent over a mock data channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentText {
    pub from: PeerId,
    pub to: PeerId,
    pub label: String,
    pub text: String,
}

#[derive(Default)]
struct NetworkState {
    slots: HashMap<Link, Slot>,
    sent: Vec<SentText>,
    failing_offers: HashSet<Link>,
    failing_answers: HashSet<Link>,
    closed: HashSet<Link>,
}

struct Slot {
    events: EventSender,
    local_desc: Option<String>,
    remote_desc: Option<String>,
    channels: Vec<Arc<MockChannel>>,
    announced: usize,
    linked: bool,
    accepted_candidates: usize,
}

/// Shared medium for a set of [`MockEngine`]s.
#[derive(Clone, Default)]
pub struct MockNetwork {
    state: Arc<Mutex<NetworkState>>,
}

impl MockNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine for the peer known to the relay as `local`.
    pub fn engine(&self, local: impl Into<PeerId>) -> MockEngine {
        MockEngine {
            local: local.into(),
            network: self.clone(),
        }
    }

    /// Makes `create_offer` fail on the connection `local -> remote`.
    pub fn fail_offers(&self, local: impl Into<PeerId>, remote: impl Into<PeerId>) {
        self.lock().failing_offers.insert((local.into(), remote.into()));
    }

    /// Makes `create_answer` fail on the connection `local -> remote`.
    pub fn fail_answers(&self, local: impl Into<PeerId>, remote: impl Into<PeerId>) {
        self.lock().failing_answers.insert((local.into(), remote.into()));
    }

    /// Every text sent so far, in send order.
    pub fn sent(&self) -> Vec<SentText> {
        self.lock().sent.clone()
    }

    /// Remote candidates `local` accepted on its connection towards `remote`.
    pub fn accepted_candidates(&self, local: &str, remote: &str) -> usize {
        self.lock()
            .slots
            .get(&(PeerId::from(local), PeerId::from(remote)))
            .map_or(0, |slot| slot.accepted_candidates)
    }

    /// Whether `local` closed its connection towards `remote`.
    pub fn is_closed(&self, local: &str, remote: &str) -> bool {
        self.lock()
            .closed
            .contains(&(PeerId::from(local), PeerId::from(remote)))
    }

    fn lock(&self) -> MutexGuard<'_, NetworkState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn record_sent(&self, sent: SentText) {
        self.lock().sent.push(sent);
    }

    fn try_link(&self, link: &Link) {
        let reverse = (link.1.clone(), link.0.clone());
        let mut state = self.lock();

        let ready = |slot: Option<&Slot>| {
            slot.is_some_and(|s| !s.linked && s.local_desc.is_some() && s.remote_desc.is_some())
        };
        if !ready(state.slots.get(link)) || !ready(state.slots.get(&reverse)) {
            return;
        }

        debug!("Linking mock connections {:?} <-> {:?}", link.0, link.1);
        self.announce_channels(&mut state, link, &reverse);
        self.announce_channels(&mut state, &reverse, link);

        for key in [link, &reverse] {
            if let Some(slot) = state.slots.get_mut(key) {
                slot.linked = true;
                for channel in &slot.channels {
                    channel.set_state(ChannelState::Open);
                }
                let _ = slot.events.send(TransportEvent::ConnectionStateChanged {
                    peer_id: key.1.clone(),
                    state: ConnectionState::Connected,
                });
            }
        }
    }

    /// Mirrors the unannounced channels of `from` onto `to`.
    fn announce_channels(&self, state: &mut NetworkState, from: &Link, to: &Link) {
        let Some(slot) = state.slots.get_mut(from) else {
            return;
        };
        let fresh: Vec<Arc<MockChannel>> = slot.channels[slot.announced..].to_vec();
        slot.announced = slot.channels.len();

        let Some(target) = state.slots.get_mut(to) else {
            return;
        };
        for channel in fresh {
            let mirror = MockChannel::new(to.clone(), channel.label.clone(), self.clone());
            channel.pair_with(&mirror);
            mirror.pair_with(&channel);

            target.channels.push(mirror.clone());
            target.announced = target.channels.len();
            let _ = target.events.send(TransportEvent::DataChannelAnnounced {
                peer_id: to.1.clone(),
                channel: mirror as Arc<dyn ChannelHandle>,
            });
        }
    }
}

/// [`TransportEngine`] for one peer of a [`MockNetwork`].
#[derive(Clone)]
pub struct MockEngine {
    local: PeerId,
    network: MockNetwork,
}

#[async_trait]
impl TransportEngine for MockEngine {
    async fn create_connection(
        &self,
        peer_id: &PeerId,
        events: EventSender,
    ) -> Result<Arc<dyn PeerTransport>, TransportError> {
        let link = (self.local.clone(), peer_id.clone());
        let mut state = self.network.lock();
        state.closed.remove(&link);
        state.slots.insert(
            link.clone(),
            Slot {
                events,
                local_desc: None,
                remote_desc: None,
                channels: Vec::new(),
                announced: 0,
                linked: false,
                accepted_candidates: 0,
            },
        );

        Ok(Arc::new(MockTransport {
            link,
            network: self.network.clone(),
        }))
    }
}

pub struct MockTransport {
    link: Link,
    network: MockNetwork,
}

impl MockTransport {
    fn token(&self, prefix: &str) -> String {
        format!("{prefix}{}:{}", self.link.0, self.link.1)
    }

    fn with_slot<T>(
        &self,
        f: impl FnOnce(&mut Slot) -> Result<T, TransportError>,
    ) -> Result<T, TransportError> {
        let mut state = self.network.lock();
        if state.closed.contains(&self.link) {
            return Err(TransportError::Closed);
        }
        let slot = state.slots.get_mut(&self.link).ok_or(TransportError::Closed)?;
        f(slot)
    }
}

#[async_trait]
impl PeerTransport for MockTransport {
    async fn create_data_channel(
        &self,
        label: &str,
        _options: &ChannelOptions,
    ) -> Result<Arc<dyn ChannelHandle>, TransportError> {
        let channel = MockChannel::new(self.link.clone(), label.to_owned(), self.network.clone());
        self.with_slot(|slot| {
            slot.channels.push(channel.clone());
            Ok(())
        })?;
        Ok(channel as Arc<dyn ChannelHandle>)
    }

    async fn create_offer(&self) -> Result<SessionDescription, TransportError> {
        if self.network.lock().failing_offers.contains(&self.link) {
            return Err(TransportError::Engine("offer generation failed".to_owned()));
        }
        Ok(SessionDescription::offer(self.token(OFFER_PREFIX)))
    }

    async fn create_answer(&self) -> Result<SessionDescription, TransportError> {
        if self.network.lock().failing_answers.contains(&self.link) {
            return Err(TransportError::Engine("answer generation failed".to_owned()));
        }
        self.with_slot(|slot| match slot.remote_desc {
            Some(_) => Ok(()),
            None => Err(TransportError::InvalidDescription(
                "no remote offer to answer".to_owned(),
            )),
        })?;
        Ok(SessionDescription::answer(self.token(ANSWER_PREFIX)))
    }

    async fn set_local_description(&self, desc: SessionDescription) -> Result<(), TransportError> {
        let events = self.with_slot(|slot| {
            slot.local_desc = Some(desc.sdp);
            Ok(slot.events.clone())
        })?;

        // Two host candidates, then end of gathering.
        let remote = self.link.1.clone();
        for port in [5000, 5001] {
            let _ = events.send(TransportEvent::CandidateDiscovered {
                peer_id: remote.clone(),
                candidate: Some(IceCandidate::new(format!(
                    "candidate:{port} 1 udp 2122260223 127.0.0.1 {port} typ host"
                ))),
            });
        }
        let _ = events.send(TransportEvent::CandidateDiscovered {
            peer_id: remote,
            candidate: None,
        });

        self.network.try_link(&self.link);
        Ok(())
    }

    async fn set_remote_description(
        &self,
        desc: SessionDescription,
    ) -> Result<(), TransportError> {
        let prefix = match desc.kind {
            SdpKind::Offer => OFFER_PREFIX,
            SdpKind::Answer => ANSWER_PREFIX,
        };
        if !desc.sdp.starts_with(prefix) {
            return Err(TransportError::InvalidDescription(desc.sdp));
        }

        self.with_slot(|slot| {
            slot.remote_desc = Some(desc.sdp);
            Ok(())
        })?;
        self.network.try_link(&self.link);
        Ok(())
    }

    async fn add_ice_candidate(&self, _candidate: IceCandidate) -> Result<(), TransportError> {
        self.with_slot(|slot| {
            if slot.remote_desc.is_none() {
                return Err(TransportError::Engine(
                    "remote description is not set".to_owned(),
                ));
            }
            slot.accepted_candidates += 1;
            Ok(())
        })
    }

    async fn close(&self) -> Result<(), TransportError> {
        let reverse = (self.link.1.clone(), self.link.0.clone());

        let (own_channels, remote) = {
            let mut state = self.network.lock();
            if !state.closed.insert(self.link.clone()) {
                return Ok(());
            }
            let own = state
                .slots
                .get(&self.link)
                .map(|slot| slot.channels.clone())
                .unwrap_or_default();
            let remote = state
                .slots
                .get(&reverse)
                .filter(|_| !state.closed.contains(&reverse))
                .map(|slot| (slot.events.clone(), slot.channels.clone()));
            (own, remote)
        };

        for channel in own_channels {
            channel.set_state(ChannelState::Closed);
        }
        if let Some((events, channels)) = remote {
            for channel in channels {
                channel.set_state(ChannelState::Closed);
            }
            let _ = events.send(TransportEvent::ConnectionStateChanged {
                peer_id: self.link.0.clone(),
                state: ConnectionState::Disconnected,
            });
        }
        Ok(())
    }
}

struct ChannelInner {
    state: ChannelState,
    binding: Option<(ChannelKey, EventSender)>,
    peer: Option<Weak<MockChannel>>,
}

/// One end of a mock data channel.
pub struct MockChannel {
    link: Link,
    label: String,
    network: MockNetwork,
    inner: Mutex<ChannelInner>,
}

impl MockChannel {
    fn new(link: Link, label: String, network: MockNetwork) -> Arc<Self> {
        Arc::new(Self {
            link,
            label,
            network,
            inner: Mutex::new(ChannelInner {
                state: ChannelState::Connecting,
                binding: None,
                peer: None,
            }),
        })
    }

    fn lock(&self) -> MutexGuard<'_, ChannelInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn pair_with(&self, peer: &Arc<MockChannel>) {
        self.lock().peer = Some(Arc::downgrade(peer));
    }

    fn set_state(&self, state: ChannelState) {
        let mut inner = self.lock();
        if inner.state == state {
            return;
        }
        inner.state = state;
        if let Some((key, events)) = &inner.binding {
            let _ = events.send(TransportEvent::ChannelStateChanged { key: *key, state });
        }
    }

    fn deliver(&self, text: &str) {
        let inner = self.lock();
        if let Some((key, events)) = &inner.binding {
            let _ = events.send(TransportEvent::ChannelMessage {
                key: *key,
                text: text.to_owned(),
            });
        }
    }
}

#[async_trait]
impl ChannelHandle for MockChannel {
    fn label(&self) -> String {
        self.label.clone()
    }

    fn ready_state(&self) -> ChannelState {
        self.lock().state
    }

    fn bind(&self, key: ChannelKey, events: EventSender) {
        let mut inner = self.lock();
        if inner.state != ChannelState::Connecting {
            let _ = events.send(TransportEvent::ChannelStateChanged {
                key,
                state: inner.state,
            });
        }
        inner.binding = Some((key, events));
    }

    async fn send_text(&self, text: &str) -> Result<(), TransportError> {
        let peer = {
            let inner = self.lock();
            if inner.state != ChannelState::Open {
                return Err(TransportError::ChannelNotOpen);
            }
            inner.peer.as_ref().and_then(Weak::upgrade)
        };

        self.network.record_sent(SentText {
            from: self.link.0.clone(),
            to: self.link.1.clone(),
            label: self.label.clone(),
            text: text.to_owned(),
        });
        if let Some(peer) = peer {
            peer.deliver(text);
        }
        Ok(())
    }

    async fn close(&self) -> Result<(), TransportError> {
        self.set_state(ChannelState::Closed);
        let peer = self.lock().peer.as_ref().and_then(Weak::upgrade);
        if let Some(peer) = peer {
            peer.set_state(ChannelState::Closed);
        }
        Ok(())
    }
}
