mod transport_engine;
mod transport_event;
mod webrtc_engine;

pub use transport_engine::*;
pub use transport_event::*;
pub use webrtc_engine::*;
