//! Context budget calculation.
//!
//! Maps a model identifier to its context size in tokens and derives the
//! character window and overlap used to split documents for that model.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::chunkers::WindowSplitter;
use crate::error::ConfigError;
use crate::types::BudgetSettings;
use crate::DEFAULT_CONTEXT_TOKENS;

/// Known model families and their context size in tokens.
///
/// Matched as case-insensitive substrings, first hit wins.
pub const MODEL_CONTEXT_LIMITS: &[(&str, usize)] = &[
    ("mistral-7b", 4096),
    ("llama-3-8b", 8192),
    ("llama-3-70b", 8192),
    ("mixtral-8x7b", 8192),
    ("gpt-3.5", 4096),
    ("gpt-4", 128_000),
    ("claude-3-opus", 200_000),
    ("command-r", 32_768),
    ("phi-2", 2048),
    ("gemma-7b", 8192),
];

/// Context size for a model identifier, falling back to the default.
pub fn context_token_limit(model_identifier: &str) -> usize {
    let needle = model_identifier.to_lowercase();
    MODEL_CONTEXT_LIMITS
        .iter()
        .find(|(family, _)| needle.contains(family))
        .map(|&(_, limit)| limit)
        .unwrap_or(DEFAULT_CONTEXT_TOKENS)
}

/// Context budget of one model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelProfile {
    /// Identifier the profile was computed for
    pub identifier: String,

    /// Maximum tokens the model accepts per request
    pub context_token_limit: usize,

    /// Characters assumed per token
    pub chars_per_token: f64,

    /// Share of each window repeated in the next
    pub overlap_ratio: f64,
}

impl ModelProfile {
    /// Window length in characters.
    pub fn window_size_chars(&self) -> usize {
        (self.context_token_limit as f64 * self.chars_per_token).floor() as usize
    }

    /// Characters shared by consecutive windows.
    pub fn overlap_chars(&self) -> usize {
        (self.window_size_chars() as f64 * self.overlap_ratio).floor() as usize
    }

    /// Build the splitter for this budget.
    pub fn splitter(&self) -> Result<WindowSplitter, ConfigError> {
        WindowSplitter::new(self.window_size_chars(), self.overlap_chars())
    }

    /// Derived sizes, for reporting.
    pub fn summary(&self) -> BudgetSummary {
        BudgetSummary {
            profile: self.clone(),
            window_size_chars: self.window_size_chars(),
            overlap_chars: self.overlap_chars(),
        }
    }
}

/// A profile together with its derived sizes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetSummary {
    #[serde(flatten)]
    pub profile: ModelProfile,
    pub window_size_chars: usize,
    pub overlap_chars: usize,
}

/// Compute the budget for a model with the default heuristics.
///
/// Unknown identifiers degrade to the default context size, never to an error.
pub fn compute_budget(model_identifier: &str) -> ModelProfile {
    compute_budget_with(model_identifier, &BudgetSettings::default())
}

/// Compute the budget for a model with explicit heuristics.
pub fn compute_budget_with(model_identifier: &str, settings: &BudgetSettings) -> ModelProfile {
    let profile = ModelProfile {
        identifier: model_identifier.to_string(),
        context_token_limit: context_token_limit(model_identifier),
        chars_per_token: settings.chars_per_token,
        overlap_ratio: settings.overlap_ratio,
    };

    debug!(
        model = %profile.identifier,
        context_tokens = profile.context_token_limit,
        window_size = profile.window_size_chars(),
        overlap_chars = profile.overlap_chars(),
        "Computed context budget"
    );

    profile
}
