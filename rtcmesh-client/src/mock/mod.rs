//! In-memory transport engine and signaling relay for driving a mesh without
//! sockets or an ICE stack.

mod memory_hub;
mod mock_engine;

pub use memory_hub::*;
pub use mock_engine::*;
