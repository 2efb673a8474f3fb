//! Nodes that produce values on their own

mod counter;
mod skip;

pub use counter::Counter;
pub use skip::SkipCounter;
