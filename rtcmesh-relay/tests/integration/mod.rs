//! Integration tests for rtcmesh-relay.
//!
//! Every test binds a relay on an ephemeral local port and talks to it over
//! real WebSocket connections.

pub mod relay_tests;

use tracing::Level;

/// Initialize tracing for tests (call once per test).
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_test_writer()
        .try_init();
}
