//! Correction records and readability score types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A sentence whose corrected form differs from the original.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrectionRecord {
    /// Sentence as it appeared in the input
    pub original: String,

    /// Sentence after correction
    pub corrected: String,

    /// Number of issues reported by the checker, when it reports them
    #[serde(rename = "num_issues", skip_serializing_if = "Option::is_none", default)]
    pub issue_count: Option<usize>,
}

impl CorrectionRecord {
    pub fn new(original: impl Into<String>, corrected: impl Into<String>, issue_count: Option<usize>) -> Self {
        Self {
            original: original.into(),
            corrected: corrected.into(),
            issue_count,
        }
    }
}

/// Aggregate view over a correction log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrectionSummary {
    /// Number of corrected sentences
    pub sentences: usize,

    /// Total issues; records without a count contribute one
    pub total_issues: usize,
}

impl CorrectionSummary {
    pub fn from_records(records: &[CorrectionRecord]) -> Self {
        Self {
            sentences: records.len(),
            total_issues: records.iter().map(|r| r.issue_count.unwrap_or(1)).sum(),
        }
    }
}

/// A single readability metric value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScoreValue {
    Number(f64),
    Label(String),
}

impl ScoreValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ScoreValue::Number(n) => Some(*n),
            ScoreValue::Label(_) => None,
        }
    }

    pub fn as_label(&self) -> Option<&str> {
        match self {
            ScoreValue::Number(_) => None,
            ScoreValue::Label(s) => Some(s),
        }
    }
}

/// Metric name to score.
pub type ReadabilityScores = BTreeMap<String, ScoreValue>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_serialization() {
        let record = CorrectionRecord::new("Teh cat sat.", "The cat sat.", Some(1));
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["num_issues"], 1);

        let without = CorrectionRecord::new("a", "b", None);
        let json = serde_json::to_value(&without).unwrap();
        assert!(json.get("num_issues").is_none());
    }

    #[test]
    fn test_summary_counts_unknown_as_one() {
        let records = vec![
            CorrectionRecord::new("a", "b", Some(3)),
            CorrectionRecord::new("c", "d", None),
        ];
        let summary = CorrectionSummary::from_records(&records);
        assert_eq!(summary.sentences, 2);
        assert_eq!(summary.total_issues, 4);
    }
}
