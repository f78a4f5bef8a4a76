//! Artifacts handed to downstream consumers.

mod artifacts;

pub use artifacts::{base_name, ArtifactWriter};
