use anyhow::Result;
use rtcmesh_core::RoomName;
use rtcmesh_relay::{RelayService, serve_listener};
use std::net::SocketAddr;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

pub const TIMEOUT_MS: u64 = 5000;

/// A relay serving on an ephemeral local port.
pub struct TestRelay {
    pub addr: SocketAddr,
    pub service: RelayService,
    task: JoinHandle<()>,
}

impl TestRelay {
    pub fn url(&self) -> String {
        format!("ws://{}/", self.addr)
    }
}

impl Drop for TestRelay {
    fn drop(&mut self) {
        self.task.abort();
    }
}

pub async fn spawn_relay() -> Result<TestRelay> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let service = RelayService::new();

    let task = tokio::spawn({
        let service = service.clone();
        async move {
            if let Err(e) = serve_listener(listener, service).await {
                tracing::error!("Test relay stopped: {}", e);
            }
        }
    });

    Ok(TestRelay {
        addr,
        service,
        task,
    })
}

/// Waits until `room` holds exactly `count` members.
pub async fn wait_for_members(service: &RelayService, room: &str, count: usize) -> bool {
    let room = RoomName::from(room);
    let start = Instant::now();

    loop {
        if service.members(&room).await.len() == count {
            return true;
        }
        if start.elapsed() > Duration::from_millis(TIMEOUT_MS) {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

/// Waits until exactly `count` sockets are connected.
pub async fn wait_for_peer_count(service: &RelayService, count: usize) -> bool {
    let start = Instant::now();

    loop {
        if service.peer_count() == count {
            return true;
        }
        if start.elapsed() > Duration::from_millis(TIMEOUT_MS) {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
