//! In-memory store tracking pipeline runs.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::types::{RunResult, RunStage, RunStatus, RunStatusResponse};

/// In-memory store of submitted runs.
pub struct RunStore {
    runs: HashMap<Uuid, RunRecord>,
}

/// Internal record for tracking a run.
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub run_id: Uuid,
    pub name: String,
    pub status: RunStatus,
    pub stage: RunStage,
    pub error: Option<String>,
    pub result: Option<RunResult>,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl RunRecord {
    pub fn new(run_id: Uuid, name: impl Into<String>) -> Self {
        Self {
            run_id,
            name: name.into(),
            status: RunStatus::Pending,
            stage: RunStage::Queued,
            error: None,
            result: None,
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
        }
    }

    pub fn start(&mut self) {
        self.status = RunStatus::Running;
        self.started_at = Some(Utc::now());
    }

    pub fn complete(&mut self, result: RunResult) {
        self.status = RunStatus::Completed;
        self.stage = RunStage::Done;
        self.result = Some(result);
        self.completed_at = Some(Utc::now());
    }

    pub fn fail(&mut self, error: String) {
        self.status = RunStatus::Failed;
        self.error = Some(error);
        self.completed_at = Some(Utc::now());
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.status, RunStatus::Completed | RunStatus::Failed)
    }

    pub fn to_response(&self) -> RunStatusResponse {
        RunStatusResponse {
            run_id: self.run_id,
            name: self.name.clone(),
            status: self.status,
            stage: self.stage,
            error: self.error.clone(),
            result: self.result.clone(),
            created_at: self.created_at,
            started_at: self.started_at,
            completed_at: self.completed_at,
        }
    }
}

impl RunStore {
    pub fn new() -> Self {
        Self {
            runs: HashMap::new(),
        }
    }

    /// Register a run and return its ID.
    pub fn create_run(&mut self, name: impl Into<String>) -> Uuid {
        let run_id = Uuid::new_v4();
        self.runs.insert(run_id, RunRecord::new(run_id, name));
        run_id
    }

    pub fn get_run(&self, run_id: Uuid) -> Option<&RunRecord> {
        self.runs.get(&run_id)
    }

    /// Apply `f` to a run, returning false for unknown IDs.
    fn update(&mut self, run_id: Uuid, f: impl FnOnce(&mut RunRecord)) -> bool {
        match self.runs.get_mut(&run_id) {
            Some(run) => {
                f(run);
                true
            }
            None => false,
        }
    }

    pub fn start_run(&mut self, run_id: Uuid) -> bool {
        self.update(run_id, RunRecord::start)
    }

    pub fn set_stage(&mut self, run_id: Uuid, stage: RunStage) -> bool {
        self.update(run_id, |run| run.stage = stage)
    }

    pub fn complete_run(&mut self, run_id: Uuid, result: RunResult) -> bool {
        self.update(run_id, |run| run.complete(result))
    }

    pub fn fail_run(&mut self, run_id: Uuid, error: String) -> bool {
        self.update(run_id, |run| run.fail(error))
    }

    pub fn get_run_status(&self, run_id: Uuid) -> Option<RunStatusResponse> {
        self.runs.get(&run_id).map(|r| r.to_response())
    }

    /// Drop finished runs older than `max_age`.
    pub fn cleanup_finished(&mut self, max_age: chrono::Duration) {
        let cutoff = Utc::now() - max_age;
        self.runs
            .retain(|_, run| !run.is_finished() || run.completed_at.map_or(true, |t| t > cutoff));
    }

    /// Count of runs per status.
    pub fn status_counts(&self) -> HashMap<RunStatus, usize> {
        let mut counts = HashMap::new();
        for run in self.runs.values() {
            *counts.entry(run.status).or_insert(0) += 1;
        }
        counts
    }

    pub fn len(&self) -> usize {
        self.runs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }
}

impl Default for RunStore {
    fn default() -> Self {
        Self::new()
    }
}
