//! Background execution of pipeline runs.

mod processor;
mod store;

pub use processor::RunProcessor;
pub use store::{RunRecord, RunStore};
