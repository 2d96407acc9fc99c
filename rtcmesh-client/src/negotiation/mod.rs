mod candidate_exchange;
mod negotiator;

pub use candidate_exchange::*;
pub use negotiator::*;
