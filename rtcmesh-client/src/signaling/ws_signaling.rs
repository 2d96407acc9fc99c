use crate::error::SignalingError;
use crate::signaling::{SignalEvent, SignalEventReceiver, SignalingChannel};
use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use rtcmesh_core::SignalMessage;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

/// Signaling over a WebSocket connection to an `rtcmesh-relay`.
pub struct WsSignaling {
    out_tx: mpsc::UnboundedSender<Message>,
    closed: Arc<AtomicBool>,
}

/// Maps `http(s)://` endpoints onto `ws(s)://`; other schemes pass through.
pub fn websocket_url(url: &str) -> String {
    if let Some(rest) = url.strip_prefix("http://") {
        format!("ws://{rest}")
    } else if let Some(rest) = url.strip_prefix("https://") {
        format!("wss://{rest}")
    } else {
        url.to_owned()
    }
}

impl WsSignaling {
    /// Connects to the relay. The returned receiver yields
    /// [`SignalEvent::Connected`] first.
    pub async fn connect(url: &str) -> Result<(Self, SignalEventReceiver), SignalingError> {
        let url = websocket_url(url);
        let (stream, _) = tokio_tungstenite::connect_async(url.as_str())
            .await
            .map_err(|e| SignalingError::Connect(e.to_string()))?;
        info!("Connected to signaling server {}", url);

        let (mut sink, mut source) = stream.split();
        let (out_tx, mut out_rx) = mpsc::unbounded_channel::<Message>();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let closed = Arc::new(AtomicBool::new(false));

        tokio::spawn(async move {
            while let Some(msg) = out_rx.recv().await {
                let is_close = matches!(msg, Message::Close(_));
                if sink.send(msg).await.is_err() || is_close {
                    break;
                }
            }
            let _ = sink.close().await;
        });

        let _ = event_tx.send(SignalEvent::Connected);

        tokio::spawn({
            let closed = closed.clone();
            async move {
                while let Some(frame) = source.next().await {
                    match frame {
                        Ok(Message::Text(text)) => {
                            match serde_json::from_str::<SignalMessage>(&text) {
                                Ok(msg) => {
                                    if event_tx.send(SignalEvent::Message(msg)).is_err() {
                                        break;
                                    }
                                }
                                Err(e) => warn!("Unrecognized signaling frame: {}", e),
                            }
                        }
                        Ok(Message::Close(_)) => break,
                        Ok(_) => {}
                        Err(e) => {
                            warn!("Signaling socket error: {}", e);
                            break;
                        }
                    }
                }

                closed.store(true, Ordering::SeqCst);
                debug!("Signaling socket finished");
                let _ = event_tx.send(SignalEvent::Disconnected);
            }
        });

        Ok((Self { out_tx, closed }, event_rx))
    }
}

#[async_trait]
impl SignalingChannel for WsSignaling {
    async fn emit(&self, msg: SignalMessage) -> Result<(), SignalingError> {
        if self.is_closed() {
            return Err(SignalingError::Closed);
        }
        let json = serde_json::to_string(&msg)?;
        self.out_tx
            .send(Message::Text(json.into()))
            .map_err(|_| SignalingError::Closed)
    }

    async fn close(&self) -> Result<(), SignalingError> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        let _ = self.out_tx.send(Message::Close(None));
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst) || self.out_tx.is_closed()
    }
}
