mod callbacks;
mod mesh;
mod mesh_command;
mod mesh_handle;
mod room;
mod snapshot;

pub use callbacks::*;
pub use mesh::*;
pub use mesh_command::*;
pub use mesh_handle::*;
pub use room::*;
pub use snapshot::*;
