//! Run request and status types for the HTTP surface.

use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{CorrectionRecord, CorrectionSummary, ReadabilityScores, Style};

/// Request to run the pipeline over one document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartRunRequest {
    /// Document name; its stem keys the written artifacts
    pub name: String,

    /// Already decoded document text
    pub text: String,

    /// Model identifier, e.g. `LM Studio: mistralai/mistral-7b-instruct-v0.3`
    #[serde(default = "default_model")]
    pub model: String,

    /// Language code (`en` or `tr`)
    #[serde(default = "default_language")]
    pub language: String,
}

fn default_model() -> String {
    "local-model".to_string()
}

fn default_language() -> String {
    "en".to_string()
}

/// Response when a run is accepted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartRunResponse {
    /// ID of the created run
    pub run_id: Uuid,

    /// Characters in the submitted document
    pub document_chars: usize,
}

/// Lifecycle of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Run is queued but not started
    Pending,
    /// Run is currently executing
    Running,
    /// Run completed
    Completed,
    /// Run failed before producing a result
    Failed,
}

/// Pipeline stage a run is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "stage", content = "style")]
pub enum RunStage {
    Queued,
    Correcting,
    Transforming(Style),
    Scoring,
    Saving,
    Done,
}

/// Results attached to a completed run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResult {
    pub corrected_document: String,
    pub corrections: Vec<CorrectionRecord>,
    pub correction_summary: CorrectionSummary,
    pub outputs: BTreeMap<Style, String>,
    pub scores: BTreeMap<Style, ReadabilityScores>,
    pub degraded_windows: usize,
    pub artifacts: Vec<PathBuf>,
}

/// Response with run status information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunStatusResponse {
    pub run_id: Uuid,
    pub name: String,
    pub status: RunStatus,
    #[serde(flatten)]
    pub stage: RunStage,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<RunResult>,

    pub created_at: DateTime<Utc>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}
