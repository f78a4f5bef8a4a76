//! Runs the pipeline for a submitted document in the background.

use std::sync::Arc;

use tokio::sync::{mpsc, RwLock};
use tracing::{error, info};
use uuid::Uuid;

use super::store::RunStore;
use crate::output::ArtifactWriter;
use crate::pipeline::Pipeline;
use crate::types::{CorrectionSummary, RunResult, RunStage};

/// Drives one pipeline run and records its progress in the run store.
pub struct RunProcessor {
    writer: Arc<ArtifactWriter>,
}

impl RunProcessor {
    pub fn new(writer: Arc<ArtifactWriter>) -> Self {
        Self { writer }
    }

    /// Execute `pipeline` over `document`, then persist its artifacts.
    ///
    /// The pipeline's external resources are released whether or not
    /// saving succeeds.
    pub async fn process_run(
        &self,
        run_id: Uuid,
        name: String,
        document: String,
        pipeline: Pipeline,
        run_store: Arc<RwLock<RunStore>>,
    ) {
        info!(run_id = %run_id, name = %name, chars = document.chars().count(), "Starting run");

        {
            let mut store = run_store.write().await;
            store.start_run(run_id);
        }

        // Stages are reported synchronously by the pipeline and applied here.
        let (tx, mut rx) = mpsc::unbounded_channel::<RunStage>();
        let stage_store = run_store.clone();
        let stage_updater = tokio::spawn(async move {
            while let Some(stage) = rx.recv().await {
                stage_store.write().await.set_stage(run_id, stage);
            }
        });

        let output = pipeline
            .run_with_progress(&document, move |stage| {
                let _ = tx.send(stage);
            })
            .await;
        pipeline.shutdown().await;
        let _ = stage_updater.await;

        {
            let mut store = run_store.write().await;
            store.set_stage(run_id, RunStage::Saving);
        }

        match self.writer.write(&name, &output).await {
            Ok(artifacts) => {
                info!(
                    run_id = %run_id,
                    corrections = output.corrections.len(),
                    degraded_windows = output.degraded_windows,
                    artifacts = artifacts.len(),
                    "Run complete"
                );
                let result = RunResult {
                    correction_summary: CorrectionSummary::from_records(&output.corrections),
                    corrected_document: output.corrected_document,
                    corrections: output.corrections,
                    outputs: output.outputs,
                    scores: output.scores,
                    degraded_windows: output.degraded_windows,
                    artifacts,
                };
                run_store.write().await.complete_run(run_id, result);
            }
            Err(e) => {
                error!(run_id = %run_id, error = %e, "Failed to save run artifacts");
                run_store.write().await.fail_run(run_id, format!("{e:#}"));
            }
        }
    }
}
