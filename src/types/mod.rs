//! Core types for the restyling service.

mod config;
mod language;
mod record;
mod run;
mod style;

pub use config::{
    BackendSettings, BudgetSettings, LanguageToolSettings, OutputSettings, ServerSettings,
    ServiceConfig,
};
pub use language::Language;
pub use record::{CorrectionRecord, CorrectionSummary, ReadabilityScores, ScoreValue};
pub use run::{RunResult, RunStage, RunStatus, RunStatusResponse, StartRunRequest, StartRunResponse};
pub use style::{Intent, Style};
