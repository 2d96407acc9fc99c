//! Integration tests for rtcmesh-client.
//!
//! Tests are organized by functionality:
//! - `join_tests` - room join sequencing and connection roles
//! - `negotiation_tests` - offer/answer and candidate exchange
//! - `messaging_tests` - data channel messaging
//! - `teardown_tests` - close, dropped handles and disconnects

pub mod join_tests;
pub mod messaging_tests;
pub mod negotiation_tests;

use tracing::Level;

/// Initialize tracing for tests (call once per test).
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_test_writer()
        .try_init();
}
