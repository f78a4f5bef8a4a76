//! HTTP surface of the restyling service.

mod error;
pub mod handlers;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

pub use error::ApiError;
pub use handlers::AppState;

/// Build the service routes over shared state.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/styles", get(handlers::list_styles))
        .route("/models/:model/budget", get(handlers::get_budget))
        .route("/runs", post(handlers::start_run))
        .route("/runs/:run_id", get(handlers::get_run_status))
        .with_state(state)
}
