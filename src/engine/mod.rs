//! Processing engine: the per-item pipeline and the poll loop that drives it

pub mod pipeline;
pub mod poller;

pub use pipeline::{Pipeline, PipelineSettings};
pub use poller::{Poller, TickReport};
