//! Pipeline orchestration: correction, per-style transformation, scoring.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use crate::backend::{build_backend, GenerativeBackend};
use crate::budget::{compute_budget_with, ModelProfile};
use crate::correction::CorrectionPipeline;
use crate::error::ConfigError;
use crate::readability::{ReadabilityScorer, TextStatScorer};
use crate::transform::{InvokerOptions, StyleTransformer, TransformationInvoker};
use crate::types::{CorrectionRecord, Language, ReadabilityScores, RunStage, ServiceConfig, Style};

/// Everything one run produces.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PipelineOutput {
    pub corrected_document: String,
    pub corrections: Vec<CorrectionRecord>,
    pub outputs: BTreeMap<Style, String>,
    pub scores: BTreeMap<Style, ReadabilityScores>,
    pub degraded_windows: usize,
}

/// Sequences correction, style transformation and readability scoring for
/// one backend, model and language.
pub struct Pipeline {
    corrector: CorrectionPipeline,
    transformer: StyleTransformer,
    scorer: Box<dyn ReadabilityScorer>,
    styles: Vec<Style>,
}

impl Pipeline {
    pub fn new(
        corrector: CorrectionPipeline,
        transformer: StyleTransformer,
        scorer: Box<dyn ReadabilityScorer>,
    ) -> Self {
        Self {
            corrector,
            transformer,
            scorer,
            styles: Style::ALL.to_vec(),
        }
    }

    /// Restrict the styles produced.
    pub fn with_styles(mut self, styles: Vec<Style>) -> Self {
        self.styles = styles;
        self
    }

    /// Build a pipeline for `model_identifier` and `language` from service configuration.
    pub async fn build(
        model_identifier: &str,
        language: Language,
        config: &ServiceConfig,
    ) -> Result<Self, ConfigError> {
        let backend = build_backend(model_identifier, &config.backend)?;
        Self::with_backend(backend, model_identifier, language, config).await
    }

    /// Build a pipeline around an existing backend.
    pub async fn with_backend(
        backend: Arc<dyn GenerativeBackend>,
        model_identifier: &str,
        language: Language,
        config: &ServiceConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let invoker = Arc::new(TransformationInvoker::new(
            backend,
            language,
            InvokerOptions::from(&config.backend),
        ));

        let profile = compute_budget_with(model_identifier, &config.budget);
        let transformer = StyleTransformer::new(invoker.clone(), profile)?
            .with_max_concurrent_windows(config.backend.max_concurrent_windows);

        let corrector = CorrectionPipeline::for_language(language, &config.languagetool, Some(invoker)).await?;

        Ok(Self::new(corrector, transformer, Box::new(TextStatScorer::new(language))))
    }

    pub fn profile(&self) -> &ModelProfile {
        self.transformer.profile()
    }

    pub fn styles(&self) -> &[Style] {
        &self.styles
    }

    /// Run the whole pipeline over `document`.
    pub async fn run(&self, document: &str) -> PipelineOutput {
        self.run_with_progress(document, |_| {}).await
    }

    /// Run the pipeline, reporting each stage as it starts.
    pub async fn run_with_progress<F>(&self, document: &str, on_stage: F) -> PipelineOutput
    where
        F: Fn(RunStage) + Send + Sync,
    {
        on_stage(RunStage::Correcting);
        let correction = self.corrector.correct(document).await;
        info!(
            corrections = correction.corrections.len(),
            failed = correction.failed_sentences,
            strategy = self.corrector.strategy_name(),
            "Correction complete"
        );

        let mut output = PipelineOutput {
            corrected_document: correction.corrected_document,
            corrections: correction.corrections,
            ..Default::default()
        };

        for &style in &self.styles {
            on_stage(RunStage::Transforming(style));
            let styled = self.transformer.transform(&output.corrected_document, style).await;
            output.degraded_windows += styled.degraded_windows;
            output.outputs.insert(style, styled.text);
        }

        on_stage(RunStage::Scoring);
        for (style, text) in &output.outputs {
            output.scores.insert(*style, self.scorer.score(text));
        }

        output
    }

    /// Release external resources held by the correction strategy.
    pub async fn shutdown(&self) {
        self.corrector.shutdown().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::GenerationRequest;
    use crate::error::BackendError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Returns the prompt's intent as a sentence.
    struct IntentBackend;

    #[async_trait]
    impl GenerativeBackend for IntentBackend {
        fn name(&self) -> &str {
            "intent"
        }

        async fn generate(&self, request: &GenerationRequest) -> Result<String, BackendError> {
            if request.intent == "grammar" {
                return Err(BackendError::EmptyOutput);
            }
            Ok(format!("Written in {} style.", request.intent))
        }
    }

    #[tokio::test]
    async fn test_turkish_pipeline_from_config() {
        let config = ServiceConfig::default();
        let pipeline = Pipeline::with_backend(Arc::new(IntentBackend), "gemma-7b", Language::Turkish, &config)
            .await
            .unwrap();
        assert_eq!(pipeline.profile().context_token_limit, 8192);

        let stages = Mutex::new(Vec::new());
        let output = pipeline
            .run_with_progress("Kedi oturdu. Mutluydu.", |stage| stages.lock().unwrap().push(stage))
            .await;

        // Grammar calls fail, so sentences pass through unchanged.
        assert_eq!(output.corrected_document, "Kedi oturdu. Mutluydu.");
        assert!(output.corrections.is_empty());

        assert_eq!(output.outputs[&Style::Children], "Written in child-friendly style.");
        assert_eq!(output.outputs.len(), 3);
        assert_eq!(output.scores.len(), 3);
        assert!(output.scores[&Style::Academic].contains_key("cefr_estimate"));

        let stages = stages.into_inner().unwrap();
        assert_eq!(stages.first(), Some(&RunStage::Correcting));
        assert_eq!(stages.last(), Some(&RunStage::Scoring));
        assert_eq!(stages.len(), 5);
    }

    #[tokio::test]
    async fn test_english_without_checker_is_config_error() {
        let config = ServiceConfig::default();
        let result = Pipeline::with_backend(Arc::new(IntentBackend), "phi-2", Language::English, &config).await;
        assert!(matches!(result, Err(ConfigError::MissingCollaborator(_))));
    }

    #[tokio::test]
    async fn test_invalid_budget_is_config_error() {
        let mut config = ServiceConfig::default();
        config.budget.overlap_ratio = 1.5;
        let result = Pipeline::build("phi-2", Language::Turkish, &config).await;
        assert!(matches!(result, Err(ConfigError::InvalidBudget(_))));
    }
}
