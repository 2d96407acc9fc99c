use crate::error::MeshError;
use crate::mesh::{Callback, MeshSnapshot};
use tokio::sync::oneshot;

/// Requests a [`MeshHandle`](crate::mesh::MeshHandle) sends to the mesh task.
#[derive(Debug)]
pub enum MeshCommand {
    On(Callback),

    SendMessage {
        text: String,
        reply: oneshot::Sender<Result<usize, MeshError>>,
    },

    Snapshot {
        reply: oneshot::Sender<MeshSnapshot>,
    },

    Close {
        reply: oneshot::Sender<Result<(), MeshError>>,
    },
}
