//! Sentence-level grammar correction.
//!
//! The document is segmented into sentences and every sentence is corrected
//! on its own by a [`CorrectionStrategy`] chosen at construction time:
//! LanguageTool for English, the generative backend for Turkish. A sentence
//! that fails to correct passes through unchanged.

mod generative;
mod languagetool;
mod rule_based;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::chunkers::SentenceTokenizer;
use crate::error::{ConfigError, CorrectionError};
use crate::transform::TransformationInvoker;
use crate::types::{CorrectionRecord, Language, LanguageToolSettings};

pub use generative::GenerativeCorrector;
pub use languagetool::{apply_replacements, LanguageToolChecker, LanguageToolServer, Replacement, RuleMatch};
pub use rule_based::{CheckOutcome, GrammarChecker, RuleBasedCorrector};

/// Corrected form of a single sentence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentenceCorrection {
    pub corrected: String,
    pub issue_count: Option<usize>,
}

/// A way of correcting one sentence.
#[async_trait]
pub trait CorrectionStrategy: Send + Sync {
    /// Name of the strategy, for logs.
    fn name(&self) -> &'static str;

    /// Correct a single sentence.
    async fn correct_sentence(&self, sentence: &str) -> Result<SentenceCorrection, CorrectionError>;

    /// Release external resources; called once the pipeline is done.
    async fn shutdown(&self) {}
}

/// Result of correcting a document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CorrectionOutcome {
    /// Corrected sentences joined with single spaces
    pub corrected_document: String,

    /// One record per changed sentence, in sentence order
    pub corrections: Vec<CorrectionRecord>,

    /// Sentences that could not be corrected and were kept as-is
    pub failed_sentences: usize,
}

/// Corrects documents sentence by sentence.
pub struct CorrectionPipeline {
    strategy: Box<dyn CorrectionStrategy>,
    tokenizer: SentenceTokenizer,
}

impl CorrectionPipeline {
    pub fn new(strategy: Box<dyn CorrectionStrategy>, language: Language) -> Self {
        Self {
            strategy,
            tokenizer: SentenceTokenizer::new(language),
        }
    }

    /// Pick the strategy for `language`.
    ///
    /// English needs a LanguageTool server (remote or launched locally);
    /// Turkish needs the generative backend.
    pub async fn for_language(
        language: Language,
        languagetool: &LanguageToolSettings,
        invoker: Option<Arc<TransformationInvoker>>,
    ) -> Result<Self, ConfigError> {
        let strategy: Box<dyn CorrectionStrategy> = match language {
            Language::English => {
                info!("Initializing LanguageTool for English");
                let checker = LanguageToolChecker::from_settings(languagetool).await?;
                Box::new(RuleBasedCorrector::new(Box::new(checker), language))
            }
            Language::Turkish => {
                let invoker = invoker.ok_or(ConfigError::MissingCollaborator(
                    "generative backend for Turkish correction",
                ))?;
                info!("Using generative backend for Turkish grammar correction");
                Box::new(GenerativeCorrector::new(invoker))
            }
        };
        Ok(Self::new(strategy, language))
    }

    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    /// Correct `document`, recording every sentence that changed.
    pub async fn correct(&self, document: &str) -> CorrectionOutcome {
        let sentences = self.tokenizer.sentences(document);
        let mut corrected_sentences = Vec::with_capacity(sentences.len());
        let mut corrections = Vec::new();
        let mut failed_sentences = 0;

        for sentence in sentences {
            match self.strategy.correct_sentence(sentence).await {
                Ok(correction) => {
                    if correction.corrected != sentence {
                        info!(
                            original = sentence,
                            corrected = %correction.corrected,
                            issues = ?correction.issue_count,
                            "Corrected sentence"
                        );
                        corrections.push(CorrectionRecord::new(
                            sentence,
                            correction.corrected.clone(),
                            correction.issue_count,
                        ));
                    }
                    corrected_sentences.push(correction.corrected);
                }
                Err(e) => {
                    warn!(sentence, error = %e, strategy = self.strategy.name(), "Error correcting sentence, keeping original");
                    failed_sentences += 1;
                    corrected_sentences.push(sentence.to_string());
                }
            }
        }

        CorrectionOutcome {
            corrected_document: corrected_sentences.join(" "),
            corrections,
            failed_sentences,
        }
    }

    /// Release the strategy's external resources.
    pub async fn shutdown(&self) {
        self.strategy.shutdown().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CheckerError;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Checker with a fixed table of fixes; sentences containing "boom" fail.
    struct TableChecker {
        fixes: HashMap<&'static str, (&'static str, usize)>,
        closed: Arc<AtomicBool>,
    }

    #[async_trait]
    impl GrammarChecker for TableChecker {
        async fn check(&self, sentence: &str, _language: Language) -> Result<CheckOutcome, CheckerError> {
            if sentence.contains("boom") {
                return Err(CheckerError::MalformedResponse("boom".to_string()));
            }
            Ok(match self.fixes.get(sentence) {
                Some((fixed, issues)) => CheckOutcome {
                    corrected_sentence: fixed.to_string(),
                    issue_count: *issues,
                },
                None => CheckOutcome {
                    corrected_sentence: sentence.to_string(),
                    issue_count: 0,
                },
            })
        }

        async fn shutdown(&self) {
            self.closed.store(true, Ordering::SeqCst);
        }
    }

    fn pipeline(fixes: &[(&'static str, &'static str, usize)]) -> (CorrectionPipeline, Arc<AtomicBool>) {
        let closed = Arc::new(AtomicBool::new(false));
        let checker = TableChecker {
            fixes: fixes.iter().map(|(o, c, n)| (*o, (*c, *n))).collect(),
            closed: closed.clone(),
        };
        let strategy = RuleBasedCorrector::new(Box::new(checker), Language::English);
        (CorrectionPipeline::new(Box::new(strategy), Language::English), closed)
    }

    #[tokio::test]
    async fn test_only_changed_sentences_are_recorded() {
        let (pipeline, _) = pipeline(&[("Teh cat sat.", "The cat sat.", 1)]);
        let outcome = pipeline.correct("Teh cat sat.  It was happy.").await;

        assert_eq!(outcome.corrected_document, "The cat sat. It was happy.");
        assert_eq!(
            outcome.corrections,
            vec![CorrectionRecord::new("Teh cat sat.", "The cat sat.", Some(1))]
        );
        assert_eq!(outcome.failed_sentences, 0);
    }

    #[tokio::test]
    async fn test_failed_sentence_passes_through() {
        let (pipeline, _) = pipeline(&[("Helo there.", "Hello there.", 1)]);
        let outcome = pipeline.correct("It went boom. Helo there.").await;

        assert_eq!(outcome.corrected_document, "It went boom. Hello there.");
        assert_eq!(outcome.corrections.len(), 1);
        assert_eq!(outcome.corrections[0].original, "Helo there.");
        assert_eq!(outcome.failed_sentences, 1);
    }

    #[tokio::test]
    async fn test_records_follow_sentence_order() {
        let (pipeline, _) = pipeline(&[("B iz.", "B is.", 1), ("A iz.", "A is.", 2)]);
        let outcome = pipeline.correct("A iz. Fine. B iz.").await;
        let originals: Vec<&str> = outcome.corrections.iter().map(|r| r.original.as_str()).collect();
        assert_eq!(originals, vec!["A iz.", "B iz."]);
    }

    #[tokio::test]
    async fn test_empty_document() {
        let (pipeline, _) = pipeline(&[]);
        let outcome = pipeline.correct("").await;
        assert_eq!(outcome, CorrectionOutcome::default());
    }

    #[tokio::test]
    async fn test_shutdown_releases_checker() {
        let (pipeline, closed) = pipeline(&[]);
        pipeline.shutdown().await;
        assert!(closed.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_turkish_requires_backend() {
        let result =
            CorrectionPipeline::for_language(Language::Turkish, &LanguageToolSettings::default(), None).await;
        assert!(matches!(result, Err(ConfigError::MissingCollaborator(_))));
    }
}
