mod dot;
#[allow(clippy::module_inception)]
mod pipeline;
mod runner;
mod validate;

pub use pipeline::{NodeId, Pipeline};
