use rtcmesh_client::{Callback, Mesh, MeshMessage};
use rtcmesh_core::PeerId;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Event types recorded by [`EventRecorder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MeshEvent {
    Ready,
    ChannelReady(PeerId),
    ChannelNotReady(PeerId),
    Message(MeshMessage),
}

/// Registers a handler for every mesh event and records what fires.
#[derive(Clone, Default)]
pub struct EventRecorder {
    events: Arc<Mutex<Vec<MeshEvent>>>,
}

impl EventRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&self, mesh: &mut Mesh) {
        for callback in self.callbacks() {
            mesh.on(callback);
        }
    }

    pub fn callbacks(&self) -> Vec<Callback> {
        let ready = self.events.clone();
        let channel_ready = self.events.clone();
        let channel_not_ready = self.events.clone();
        let message = self.events.clone();

        vec![
            Callback::ready(move || ready.lock().unwrap().push(MeshEvent::Ready)),
            Callback::channel_ready(move |peer| {
                channel_ready
                    .lock()
                    .unwrap()
                    .push(MeshEvent::ChannelReady(peer.clone()))
            }),
            Callback::channel_not_ready(move |peer| {
                channel_not_ready
                    .lock()
                    .unwrap()
                    .push(MeshEvent::ChannelNotReady(peer.clone()))
            }),
            Callback::message(move |msg| message.lock().unwrap().push(MeshEvent::Message(msg))),
        ]
    }

    pub fn events(&self) -> Vec<MeshEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn count(&self, pred: impl Fn(&MeshEvent) -> bool) -> usize {
        self.events.lock().unwrap().iter().filter(|e| pred(e)).count()
    }

    pub fn messages(&self) -> Vec<MeshMessage> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter_map(|e| match e {
                MeshEvent::Message(msg) => Some(msg.clone()),
                _ => None,
            })
            .collect()
    }

    /// Polls until `pred` holds for the recorded events.
    pub async fn wait_for(&self, pred: impl Fn(&[MeshEvent]) -> bool, timeout_ms: u64) -> bool {
        let start = Instant::now();
        let timeout = Duration::from_millis(timeout_ms);

        loop {
            if pred(&self.events.lock().unwrap()) {
                return true;
            }
            if start.elapsed() > timeout {
                return false;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }

    pub async fn wait_for_messages(&self, count: usize, timeout_ms: u64) -> bool {
        self.wait_for(
            |events| {
                events
                    .iter()
                    .filter(|e| matches!(e, MeshEvent::Message(_)))
                    .count()
                    >= count
            },
            timeout_ms,
        )
        .await
    }

    pub async fn wait_for_ready(&self, timeout_ms: u64) -> bool {
        self.wait_for(|events| events.contains(&MeshEvent::Ready), timeout_ms)
            .await
    }
}
