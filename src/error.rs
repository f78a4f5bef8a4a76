//! Error types shared across the pipeline.
//!
//! Only [`ConfigError`] is fatal: it surfaces from constructors. Backend and
//! checker failures are recovered per window or per sentence by their callers.

use std::time::Duration;

use thiserror::Error;

/// Invalid or incomplete pipeline configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unsupported language: {0}")]
    UnsupportedLanguage(String),

    #[error("missing required collaborator: {0}")]
    MissingCollaborator(&'static str),

    #[error("invalid context budget: {0}")]
    InvalidBudget(String),

    #[error("invalid setting `{key}`: {reason}")]
    InvalidSetting { key: &'static str, reason: String },

    #[error("grammar checker unavailable: {0}")]
    CheckerUnavailable(#[source] CheckerError),
}

/// Failure of a single generative backend call.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("backend returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("backend returned no text")]
    EmptyOutput,

    #[error("backend call timed out after {0:?}")]
    Timeout(Duration),
}

/// Failure of the rule-based grammar checker.
#[derive(Debug, Error)]
pub enum CheckerError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("checker returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed checker response: {0}")]
    MalformedResponse(String),

    #[error("checker server I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("checker server did not become ready within {0:?}")]
    StartupTimeout(Duration),
}

/// Failure to correct a single sentence, whichever strategy was used.
#[derive(Debug, Error)]
pub enum CorrectionError {
    #[error(transparent)]
    Checker(#[from] CheckerError),

    #[error(transparent)]
    Backend(#[from] BackendError),
}
