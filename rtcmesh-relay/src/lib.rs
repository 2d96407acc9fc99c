//! Room-scoped signaling relay.
//!
//! Peers connect over WebSocket, join a named room and exchange negotiation
//! payloads with the other members of that room.

mod config;
pub mod signaling;

pub use config::RelayConfig;
pub use signaling::{RelayService, router, serve, serve_listener, ws_handler};
