pub mod directory;
pub mod model;
pub mod utils;

pub use directory::{JoinOutcome, RoomDirectory};
pub use model::*;
