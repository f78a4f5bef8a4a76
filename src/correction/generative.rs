//! Correction through the generative backend.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use super::{CorrectionStrategy, SentenceCorrection};
use crate::error::CorrectionError;
use crate::transform::TransformationInvoker;
use crate::types::Intent;

/// Asks the model to fix one sentence at a time. No issue count is available.
pub struct GenerativeCorrector {
    invoker: Arc<TransformationInvoker>,
}

impl GenerativeCorrector {
    pub fn new(invoker: Arc<TransformationInvoker>) -> Self {
        Self { invoker }
    }
}

#[async_trait]
impl CorrectionStrategy for GenerativeCorrector {
    fn name(&self) -> &'static str {
        "generative"
    }

    async fn correct_sentence(&self, sentence: &str) -> Result<SentenceCorrection, CorrectionError> {
        debug!(sentence, "Sending sentence to model for correction");
        let corrected = self.invoker.request(sentence, Intent::GrammarFix).await?;
        Ok(SentenceCorrection {
            corrected: corrected.trim().to_string(),
            issue_count: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{GenerationRequest, GenerativeBackend};
    use crate::correction::CorrectionPipeline;
    use crate::error::BackendError;
    use crate::transform::InvokerOptions;
    use crate::types::{CorrectionRecord, Language};
    use pretty_assertions::assert_eq;

    /// Fixes one known misspelling and echoes every other sentence.
    struct SpellingBackend;

    #[async_trait]
    impl GenerativeBackend for SpellingBackend {
        fn name(&self) -> &str {
            "spelling"
        }

        async fn generate(&self, request: &GenerationRequest) -> Result<String, BackendError> {
            let sentence = request.prompt.lines().nth(1).unwrap_or_default();
            Ok(format!("  {}\n", sentence.replace("otrdu", "oturdu")))
        }
    }

    fn corrector() -> CorrectionPipeline {
        let invoker = TransformationInvoker::new(
            Arc::new(SpellingBackend),
            Language::Turkish,
            InvokerOptions::default(),
        );
        CorrectionPipeline::new(Box::new(GenerativeCorrector::new(Arc::new(invoker))), Language::Turkish)
    }

    #[tokio::test]
    async fn test_corrections_have_no_issue_count() {
        let outcome = corrector().correct("Kedi otrdu. Köpek havladı.").await;

        assert_eq!(outcome.corrected_document, "Kedi oturdu. Köpek havladı.");
        assert_eq!(
            outcome.corrections,
            vec![CorrectionRecord {
                original: "Kedi otrdu.".to_string(),
                corrected: "Kedi oturdu.".to_string(),
                issue_count: None,
            }]
        );

        let json = serde_json::to_value(&outcome.corrections[0]).unwrap();
        assert!(json.get("num_issues").is_none());
    }
}
