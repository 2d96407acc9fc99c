mod peer_connection;
mod registry;

pub use peer_connection::*;
pub use registry::*;
