//! Generative text backends.
//!
//! Every transport sits behind [`GenerativeBackend`]: a prompt goes in,
//! generated text comes out, or the call fails with a [`BackendError`].

mod chat_completions;
mod text_generation;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{BackendError, ConfigError};
use crate::types::BackendSettings;

pub use chat_completions::ChatCompletionsBackend;
pub use text_generation::TextGenerationBackend;

/// Model identifier prefix selecting an LM Studio server.
pub const LM_STUDIO_PREFIX: &str = "LM Studio:";

/// Model identifier prefix selecting a text-generation inference endpoint.
pub const TEXT_GENERATION_PREFIX: &str = "hf:";

/// A single generation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    /// Full instruction sent to the model
    pub prompt: String,

    /// Target style label or intent (`grammar`)
    pub intent: String,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>, intent: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            intent: intent.into(),
        }
    }
}

/// Request/response contract of a generative model.
#[async_trait]
pub trait GenerativeBackend: Send + Sync {
    /// Name of the backend, for logs.
    fn name(&self) -> &str;

    /// Generate text for the request.
    async fn generate(&self, request: &GenerationRequest) -> Result<String, BackendError>;
}

/// Transport chosen for a model identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendTarget {
    /// OpenAI-compatible chat completions (LM Studio)
    ChatCompletions { model: String },
    /// Text-generation inference endpoint
    TextGeneration { model: String },
}

impl BackendTarget {
    /// Pick the transport from the identifier's prefix.
    ///
    /// `LM Studio: <model>` and bare identifiers go to chat completions,
    /// `hf:<model>` goes to a text-generation endpoint.
    pub fn resolve(model_identifier: &str) -> Self {
        let identifier = model_identifier.trim();
        if let Some(model) = identifier.strip_prefix(TEXT_GENERATION_PREFIX) {
            return BackendTarget::TextGeneration {
                model: model.trim().to_string(),
            };
        }
        let model = identifier
            .strip_prefix(LM_STUDIO_PREFIX)
            .unwrap_or(identifier)
            .trim();
        BackendTarget::ChatCompletions {
            model: model.to_string(),
        }
    }
}

/// Build the backend serving `model_identifier`.
pub fn build_backend(
    model_identifier: &str,
    settings: &BackendSettings,
) -> Result<Arc<dyn GenerativeBackend>, ConfigError> {
    let backend: Arc<dyn GenerativeBackend> = match BackendTarget::resolve(model_identifier) {
        BackendTarget::ChatCompletions { model } => {
            Arc::new(ChatCompletionsBackend::new(&settings.chat_base_url, &model, settings)?)
        }
        BackendTarget::TextGeneration { model } => {
            Arc::new(TextGenerationBackend::new(&model, settings)?)
        }
    };
    Ok(backend)
}

/// Shared HTTP client construction for backends.
pub(crate) fn http_client(settings: &BackendSettings) -> Result<reqwest::Client, ConfigError> {
    reqwest::Client::builder()
        .timeout(settings.request_timeout())
        .build()
        .map_err(|e| ConfigError::InvalidSetting {
            key: "backend",
            reason: format!("failed to create HTTP client: {e}"),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_lm_studio_prefix() {
        assert_eq!(
            BackendTarget::resolve("LM Studio: TheBloke/phi-2-GGUF"),
            BackendTarget::ChatCompletions {
                model: "TheBloke/phi-2-GGUF".to_string()
            }
        );
    }

    #[test]
    fn test_resolve_text_generation_prefix() {
        assert_eq!(
            BackendTarget::resolve("hf:prithivida/parrot_paraphraser_on_T5"),
            BackendTarget::TextGeneration {
                model: "prithivida/parrot_paraphraser_on_T5".to_string()
            }
        );
    }

    #[test]
    fn test_resolve_bare_identifier() {
        assert_eq!(
            BackendTarget::resolve("local-model"),
            BackendTarget::ChatCompletions {
                model: "local-model".to_string()
            }
        );
    }

    #[test]
    fn test_build_backend_names() {
        let settings = BackendSettings::default();
        let chat = build_backend("LM Studio: gemma-2-2b-it", &settings).unwrap();
        assert_eq!(chat.name(), "chat-completions");
        let tgi = build_backend("hf:gpt2", &settings).unwrap();
        assert_eq!(tgi.name(), "text-generation");
    }
}
