use crate::error::MeshError;
use crate::mesh::{Callback, MeshCommand, MeshSnapshot};
use tokio::sync::{mpsc, oneshot};

/// Cloneable handle to a running mesh.
#[derive(Clone, Debug)]
pub struct MeshHandle {
    commands: mpsc::Sender<MeshCommand>,
}

impl MeshHandle {
    pub(crate) fn new(commands: mpsc::Sender<MeshCommand>) -> Self {
        Self { commands }
    }

    /// Registers a handler, replacing any previous handler for the same event.
    pub async fn on(&self, callback: Callback) -> Result<(), MeshError> {
        self.commands
            .send(MeshCommand::On(callback))
            .await
            .map_err(|_| MeshError::Closed)
    }

    /// Sends `text` on every data channel of the mesh. Returns the number of
    /// channels it was delivered to, or the first send failure.
    pub async fn send_message(&self, text: impl Into<String>) -> Result<usize, MeshError> {
        let (reply, rx) = oneshot::channel();
        self.request(MeshCommand::SendMessage {
            text: text.into(),
            reply,
        })
        .await?;
        rx.await.map_err(|_| MeshError::Closed)?
    }

    pub async fn snapshot(&self) -> Result<MeshSnapshot, MeshError> {
        let (reply, rx) = oneshot::channel();
        self.request(MeshCommand::Snapshot { reply }).await?;
        rx.await.map_err(|_| MeshError::Closed)
    }

    /// Closes every peer connection, then the signaling channel, and stops
    /// the mesh task. Fails with [`MeshError::Closed`] once the mesh is gone.
    pub async fn close(&self) -> Result<(), MeshError> {
        let (reply, rx) = oneshot::channel();
        self.request(MeshCommand::Close { reply }).await?;
        rx.await.map_err(|_| MeshError::Closed)?
    }

    pub fn is_closed(&self) -> bool {
        self.commands.is_closed()
    }

    async fn request(&self, cmd: MeshCommand) -> Result<(), MeshError> {
        self.commands.send(cmd).await.map_err(|_| MeshError::Closed)
    }
}
