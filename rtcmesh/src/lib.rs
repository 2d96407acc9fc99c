pub use rtcmesh_core::model::{PeerId, RoomName};

pub mod model {
    pub use rtcmesh_core::model::*;
}

#[cfg(feature = "client")]
pub mod client {
    pub use rtcmesh_client::*;
}

#[cfg(feature = "relay")]
pub mod relay {
    pub use rtcmesh_relay::*;
}
