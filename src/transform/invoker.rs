//! Per-window transformation with failure isolation.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, warn};

use super::prompt::build_prompt;
use crate::backend::{GenerationRequest, GenerativeBackend};
use crate::error::BackendError;
use crate::types::{BackendSettings, Intent, Language, Style};
use crate::DEFAULT_REQUEST_TIMEOUT_SECS;

/// Placeholder substituted for a window whose transformation failed.
///
/// It carries no sentence terminator, so segmentation keeps it whole, and the
/// window number keeps placeholders of different windows distinct.
pub fn degraded_placeholder(index: usize) -> String {
    format!("[transformation unavailable for window {}]", index + 1)
}

/// Result of transforming one window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransformedWindow {
    /// Position of the source window in split order
    pub index: usize,

    /// Generated text, or the placeholder when degraded
    pub text: String,

    /// Whether the backend failed for this window
    pub degraded: bool,

    /// Failure description for degraded windows
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TransformedWindow {
    pub fn generated(index: usize, text: String) -> Self {
        Self {
            index,
            text,
            degraded: false,
            error: None,
        }
    }

    pub fn degraded(index: usize, error: &BackendError) -> Self {
        Self {
            index,
            text: degraded_placeholder(index),
            degraded: true,
            error: Some(error.to_string()),
        }
    }
}

impl AsRef<str> for TransformedWindow {
    fn as_ref(&self) -> &str {
        &self.text
    }
}

/// Timeout and retry policy for backend calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvokerOptions {
    /// Upper bound on one backend call
    pub timeout: Duration,

    /// Extra attempts after a failure
    pub max_retries: u32,

    /// Pause between attempts
    pub retry_backoff: Duration,
}

impl Default for InvokerOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            max_retries: 0,
            retry_backoff: Duration::from_millis(500),
        }
    }
}

impl From<&BackendSettings> for InvokerOptions {
    fn from(settings: &BackendSettings) -> Self {
        Self {
            timeout: settings.request_timeout(),
            max_retries: settings.max_retries,
            retry_backoff: settings.retry_backoff(),
        }
    }
}

/// Builds language-aware instructions and calls the generative backend.
pub struct TransformationInvoker {
    backend: Arc<dyn GenerativeBackend>,
    language: Language,
    options: InvokerOptions,
}

impl TransformationInvoker {
    pub fn new(backend: Arc<dyn GenerativeBackend>, language: Language, options: InvokerOptions) -> Self {
        Self {
            backend,
            language,
            options,
        }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn options(&self) -> InvokerOptions {
        self.options
    }

    /// Send `text` under `intent`, with the configured timeout and retries.
    ///
    /// Retries are local to this call and never observe other requests.
    pub async fn request(&self, text: &str, intent: Intent) -> Result<String, BackendError> {
        let request = GenerationRequest::new(build_prompt(text, intent, self.language), intent.label());
        let mut attempt = 0;

        loop {
            let result = match tokio::time::timeout(self.options.timeout, self.backend.generate(&request)).await {
                Ok(result) => result,
                Err(_) => Err(BackendError::Timeout(self.options.timeout)),
            };

            match result {
                Ok(text) => return Ok(text),
                Err(e) if attempt < self.options.max_retries => {
                    attempt += 1;
                    warn!(
                        backend = self.backend.name(),
                        attempt,
                        max_retries = self.options.max_retries,
                        error = %e,
                        "Backend call failed, retrying"
                    );
                    tokio::time::sleep(self.options.retry_backoff).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Rewrite one window in `style`; failures yield a degraded window.
    pub async fn transform_window(&self, index: usize, window_text: &str, style: Style) -> TransformedWindow {
        debug!(window = index + 1, style = %style, chars = window_text.chars().count(), "Processing window");

        match self.request(window_text, Intent::Rewrite(style)).await {
            Ok(text) => TransformedWindow::generated(index, text),
            Err(e) => {
                warn!(
                    window = index + 1,
                    style = %style,
                    error = %e,
                    "Window transformation failed, substituting placeholder"
                );
                TransformedWindow::degraded(index, &e)
            }
        }
    }
}
