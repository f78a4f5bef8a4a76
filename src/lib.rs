//! Restyler Library
//!
//! Grammar correction and multi-style rewriting of arbitrarily long documents
//! through a bounded-context generative model. Text is cut into overlapping
//! windows sized to the model's context budget, each window is rewritten
//! independently, and the results are stitched back together sentence by
//! sentence without duplicating content at window seams.

pub mod api;
pub mod backend;
pub mod budget;
pub mod chunkers;
pub mod correction;
pub mod error;
pub mod jobs;
pub mod output;
pub mod pipeline;
pub mod readability;
pub mod transform;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use budget::{compute_budget, ModelProfile};
pub use chunkers::{SentenceMerger, SentenceTokenizer, Window, WindowSplitter};
pub use correction::{CorrectionPipeline, CorrectionStrategy};
pub use error::{BackendError, CheckerError, ConfigError, CorrectionError};
pub use pipeline::{Pipeline, PipelineOutput};
pub use types::{CorrectionRecord, Language, Style};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::backend::{GenerationRequest, GenerativeBackend};
    pub use crate::budget::*;
    pub use crate::chunkers::*;
    pub use crate::correction::*;
    pub use crate::error::*;
    pub use crate::pipeline::*;
    pub use crate::readability::{ReadabilityScorer, TextStatScorer};
    pub use crate::transform::{StyleTransformer, TransformationInvoker, TransformedWindow};
    pub use crate::types::*;
}

/// Default context size in tokens for models missing from the budget table
pub const DEFAULT_CONTEXT_TOKENS: usize = 4096;

/// Default characters-per-token heuristic
pub const DEFAULT_CHARS_PER_TOKEN: f64 = 3.0;

/// Default share of a window repeated at the start of the next one
pub const DEFAULT_OVERLAP_RATIO: f64 = 0.2;

/// Default timeout for a single backend call (seconds)
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;
