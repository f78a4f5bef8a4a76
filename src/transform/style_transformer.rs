//! Sliding-window style transformation.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use serde::Serialize;
use tracing::{debug, info};

use super::invoker::{TransformationInvoker, TransformedWindow};
use crate::budget::ModelProfile;
use crate::chunkers::{SentenceMerger, WindowSplitter};
use crate::error::ConfigError;
use crate::types::Style;

/// Merged output of one style together with window statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StyledDocument {
    pub style: Style,
    pub text: String,
    pub windows: usize,
    pub degraded_windows: usize,
}

/// Rewrites whole documents: split into windows, transform each window,
/// merge the results back sentence by sentence.
pub struct StyleTransformer {
    invoker: Arc<TransformationInvoker>,
    profile: ModelProfile,
    splitter: WindowSplitter,
    merger: SentenceMerger,
    max_concurrent_windows: usize,
}

impl StyleTransformer {
    pub fn new(invoker: Arc<TransformationInvoker>, profile: ModelProfile) -> Result<Self, ConfigError> {
        let splitter = profile.splitter()?;
        let merger = SentenceMerger::new(invoker.language());
        Ok(Self {
            invoker,
            profile,
            splitter,
            merger,
            max_concurrent_windows: 1,
        })
    }

    /// Allow up to `limit` windows in flight. Results are still merged in
    /// split order.
    pub fn with_max_concurrent_windows(mut self, limit: usize) -> Self {
        self.max_concurrent_windows = limit.max(1);
        self
    }

    pub fn profile(&self) -> &ModelProfile {
        &self.profile
    }

    /// Transform every window of `text`, returned in split order.
    pub async fn transform_windows(&self, text: &str, style: Style) -> Vec<TransformedWindow> {
        let windows: Vec<(usize, String)> = self
            .splitter
            .split(text)
            .into_iter()
            .map(|window| (window.index, window.text.to_string()))
            .collect();
        debug!(style = %style, windows = windows.len(), "Starting sliding window transformation");

        // Each window future owns its text and invoker handle so the stream
        // stays `Send` when a run is spawned. `buffered` yields in input order.
        let invoker = self.invoker.clone();
        stream::iter(windows)
            .map(move |(index, window_text)| {
                let invoker = invoker.clone();
                async move { invoker.transform_window(index, &window_text, style).await }
            })
            .buffered(self.max_concurrent_windows)
            .collect()
            .await
    }

    /// Rewrite `text` in `style`.
    pub async fn transform(&self, text: &str, style: Style) -> StyledDocument {
        let transformed = self.transform_windows(text, style).await;
        let degraded_windows = transformed.iter().filter(|w| w.degraded).count();
        let merged = self.merger.merge(&transformed);

        info!(
            style = %style,
            windows = transformed.len(),
            degraded = degraded_windows,
            chars = merged.chars().count(),
            "Style transformation complete"
        );

        StyledDocument {
            style,
            text: merged,
            windows: transformed.len(),
            degraded_windows,
        }
    }
}
