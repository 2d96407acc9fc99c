pub mod event_recorder;
pub mod mesh_harness;

pub use event_recorder::*;
pub use mesh_harness::*;
