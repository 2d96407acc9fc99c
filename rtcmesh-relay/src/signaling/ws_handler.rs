use crate::RelayConfig;
use crate::signaling::RelayService;
use axum::Router;
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use axum::routing::get;
use futures::{SinkExt, StreamExt};
use rtcmesh_core::{PeerId, SignalMessage};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing::{info, warn};

pub fn router(service: RelayService) -> Router {
    Router::new()
        .route("/", get(ws_handler))
        .with_state(service)
}

/// Binds `config.bind` and serves until the listener fails.
pub async fn serve(config: RelayConfig) -> anyhow::Result<()> {
    let listener = TcpListener::bind(config.bind).await?;
    info!("Signaling relay listening on ws://{}", listener.local_addr()?);
    serve_listener(listener, RelayService::new()).await
}

pub async fn serve_listener(listener: TcpListener, service: RelayService) -> anyhow::Result<()> {
    axum::serve(listener, router(service)).await?;
    Ok(())
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(service): State<RelayService>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, PeerId::new(), service))
}

async fn handle_socket(socket: WebSocket, peer_id: PeerId, service: RelayService) {
    info!("New WebSocket connection: {:?}", peer_id);

    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel();

    service.add_peer(peer_id.clone(), tx);

    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(msg).await.is_err() {
                break;
            }
        }
    });

    let mut recv_task = tokio::spawn({
        let service = service.clone();
        let peer_id = peer_id.clone();

        async move {
            while let Some(Ok(msg)) = receiver.next().await {
                match msg {
                    Message::Text(text) => match serde_json::from_str::<SignalMessage>(&text) {
                        Ok(signal) => service.handle_signal(&peer_id, signal).await,
                        Err(e) => warn!("Invalid SignalMessage from {:?}: {:?}", peer_id, e),
                    },
                    Message::Close(_) => break,
                    _ => {}
                }
            }
        }
    });

    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    };

    service.remove_peer(&peer_id).await;
    info!("WebSocket disconnected: {:?}", peer_id);
}
