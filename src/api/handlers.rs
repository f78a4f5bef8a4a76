//! HTTP request handlers for the restyling service.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use super::ApiError;
use crate::budget::{compute_budget_with, BudgetSummary};
use crate::jobs::{RunProcessor, RunStore};
use crate::output::ArtifactWriter;
use crate::pipeline::Pipeline;
use crate::types::{
    Language, RunStatusResponse, ServiceConfig, StartRunRequest, StartRunResponse, Style,
};

/// Application state shared across handlers.
pub struct AppState {
    pub config: ServiceConfig,
    pub runs: Arc<RwLock<RunStore>>,
    pub writer: Arc<ArtifactWriter>,
}

impl AppState {
    pub fn new(config: ServiceConfig) -> Self {
        let writer = Arc::new(ArtifactWriter::new(config.output.dir.clone()));
        Self {
            config,
            runs: Arc::new(RwLock::new(RunStore::new())),
            writer,
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: String,
    version: String,
}

/// Health check endpoint.
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// A style a run produces.
#[derive(Debug, Serialize)]
pub struct StyleInfo {
    key: &'static str,
    label: &'static str,
}

/// List the target styles.
pub async fn list_styles() -> Json<Vec<StyleInfo>> {
    Json(
        Style::ALL
            .iter()
            .map(|style| StyleInfo {
                key: style.key(),
                label: style.label(),
            })
            .collect(),
    )
}

/// Context budget the service would use for a model.
pub async fn get_budget(
    State(state): State<Arc<AppState>>,
    Path(model): Path<String>,
) -> Json<BudgetSummary> {
    Json(compute_budget_with(&model, &state.config.budget).summary())
}

/// Accept a document and run the pipeline over it in the background.
///
/// The pipeline is assembled before the run is accepted so that
/// configuration problems are reported to the caller.
pub async fn start_run(
    State(state): State<Arc<AppState>>,
    Json(request): Json<StartRunRequest>,
) -> Result<(StatusCode, Json<StartRunResponse>), ApiError> {
    if request.name.trim().is_empty() {
        return Err(ApiError::BadRequest("document name must not be empty".to_string()));
    }
    let language = Language::parse(&request.language)?;
    let pipeline = Pipeline::build(&request.model, language, &state.config).await?;

    let document_chars = request.text.chars().count();
    info!(
        name = %request.name,
        model = %request.model,
        language = %language,
        chars = document_chars,
        "Received run request"
    );

    let run_id = {
        let mut store = state.runs.write().await;
        store.create_run(request.name.clone())
    };

    let processor = RunProcessor::new(state.writer.clone());
    let runs = state.runs.clone();
    tokio::spawn(async move {
        processor
            .process_run(run_id, request.name, request.text, pipeline, runs)
            .await;
    });

    Ok((
        StatusCode::ACCEPTED,
        Json(StartRunResponse {
            run_id,
            document_chars,
        }),
    ))
}

/// Get run status, including results once completed.
pub async fn get_run_status(
    State(state): State<Arc<AppState>>,
    Path(run_id): Path<Uuid>,
) -> Result<Json<RunStatusResponse>, ApiError> {
    let store = state.runs.read().await;
    store.get_run_status(run_id).map(Json).ok_or(ApiError::NotFound)
}
