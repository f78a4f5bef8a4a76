//! Rule-based correction through a grammar checker.

use async_trait::async_trait;

use super::{CorrectionStrategy, SentenceCorrection};
use crate::error::{CheckerError, CorrectionError};
use crate::types::Language;

/// Outcome of checking one sentence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckOutcome {
    pub corrected_sentence: String,
    pub issue_count: usize,
}

/// A grammar checker: sentence in, corrected sentence and issue count out.
#[async_trait]
pub trait GrammarChecker: Send + Sync {
    async fn check(&self, sentence: &str, language: Language) -> Result<CheckOutcome, CheckerError>;

    /// Release any external resources held by the checker.
    async fn shutdown(&self) {}
}

/// Correction strategy backed by a [`GrammarChecker`].
pub struct RuleBasedCorrector {
    checker: Box<dyn GrammarChecker>,
    language: Language,
}

impl RuleBasedCorrector {
    pub fn new(checker: Box<dyn GrammarChecker>, language: Language) -> Self {
        Self { checker, language }
    }
}

#[async_trait]
impl CorrectionStrategy for RuleBasedCorrector {
    fn name(&self) -> &'static str {
        "rule-based"
    }

    async fn correct_sentence(&self, sentence: &str) -> Result<SentenceCorrection, CorrectionError> {
        let outcome = self.checker.check(sentence, self.language).await?;
        Ok(SentenceCorrection {
            corrected: outcome.corrected_sentence,
            issue_count: Some(outcome.issue_count),
        })
    }

    async fn shutdown(&self) {
        self.checker.shutdown().await;
    }
}
