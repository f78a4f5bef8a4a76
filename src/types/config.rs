//! Service and pipeline configuration.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::{DEFAULT_CHARS_PER_TOKEN, DEFAULT_OVERLAP_RATIO, DEFAULT_REQUEST_TIMEOUT_SECS};

/// Environment variable pointing at an optional configuration file.
pub const CONFIG_PATH_ENV: &str = "RESTYLER_CONFIG";

/// Prefix of environment overrides, e.g. `RESTYLER_BACKEND__MAX_RETRIES=2`.
pub const ENV_PREFIX: &str = "RESTYLER";

/// Global service configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub server: ServerSettings,
    pub budget: BudgetSettings,
    pub backend: BackendSettings,
    pub languagetool: LanguageToolSettings,
    pub output: OutputSettings,
}

impl ServiceConfig {
    /// Load configuration: defaults, then `restyler.toml` (or the file named by
    /// `RESTYLER_CONFIG`), then `RESTYLER_*` environment variables.
    pub fn load() -> Result<Self> {
        let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| "restyler".to_string());
        Self::load_from(&path)
    }

    /// Load configuration with an explicit file path (extension optional).
    pub fn load_from(path: &str) -> Result<Self> {
        let defaults = config::Config::try_from(&ServiceConfig::default())
            .context("Failed to seed configuration defaults")?;

        let config: ServiceConfig = config::Config::builder()
            .add_source(defaults)
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to build configuration")?
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        config.validate()?;
        Ok(config)
    }

    /// Check every section for values the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.budget.validate()?;
        self.backend.validate()?;
        Ok(())
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Port the service listens on
    pub port: u16,

    /// How long finished runs stay queryable
    pub run_retention_secs: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            port: 3017,
            run_retention_secs: 3600,
        }
    }
}

impl ServerSettings {
    pub fn run_retention(&self) -> Duration {
        Duration::from_secs(self.run_retention_secs)
    }
}

/// Context budget heuristics.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct BudgetSettings {
    /// Characters assumed per model token
    pub chars_per_token: f64,

    /// Share of each window repeated at the start of the next
    pub overlap_ratio: f64,
}

impl Default for BudgetSettings {
    fn default() -> Self {
        Self {
            chars_per_token: DEFAULT_CHARS_PER_TOKEN,
            overlap_ratio: DEFAULT_OVERLAP_RATIO,
        }
    }
}

impl BudgetSettings {
    /// `overlap_ratio` must lie in `[0, 1)` so that the window step stays positive.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.chars_per_token.is_finite() && self.chars_per_token > 0.0) {
            return Err(ConfigError::InvalidBudget(format!(
                "chars_per_token must be positive, got {}",
                self.chars_per_token
            )));
        }
        if !(0.0..1.0).contains(&self.overlap_ratio) {
            return Err(ConfigError::InvalidBudget(format!(
                "overlap_ratio must be in [0, 1), got {}",
                self.overlap_ratio
            )));
        }
        Ok(())
    }
}

/// Generative backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendSettings {
    /// Base URL of an OpenAI-compatible server (LM Studio by default)
    pub chat_base_url: String,

    /// URL of a text-generation inference endpoint, used for `hf:` models
    pub text_generation_url: Option<String>,

    /// Bearer token sent to the text-generation endpoint
    pub api_token: Option<String>,

    /// Sampling temperature for chat completions
    pub temperature: f32,

    /// Completion budget for chat completions
    pub max_tokens: u32,

    /// Completion budget for text generation
    pub max_new_tokens: u32,

    /// Timeout for a single backend call
    pub request_timeout_secs: u64,

    /// Extra attempts after a failed call; 0 disables retries
    pub max_retries: u32,

    /// Pause between attempts
    pub retry_backoff_ms: u64,

    /// Windows transformed at once; 1 keeps processing sequential
    pub max_concurrent_windows: usize,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            chat_base_url: "http://localhost:1234/v1".to_string(),
            text_generation_url: None,
            api_token: None,
            temperature: 0.7,
            max_tokens: 512,
            max_new_tokens: 200,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            max_retries: 0,
            retry_backoff_ms: 500,
            max_concurrent_windows: 1,
        }
    }
}

impl BackendSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidSetting {
                key: "backend.request_timeout_secs",
                reason: "must be at least one second".to_string(),
            });
        }
        if self.max_concurrent_windows == 0 {
            return Err(ConfigError::InvalidSetting {
                key: "backend.max_concurrent_windows",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }
}

/// LanguageTool settings for rule-based correction.
///
/// Either point `url` at a running server, or give `jar_path` (and usually
/// `java_home`) to have the checker launch and own a local server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LanguageToolSettings {
    /// URL of an already running LanguageTool server
    pub url: Option<String>,

    /// JDK used to launch a local server
    pub java_home: Option<PathBuf>,

    /// LanguageTool server jar (`languagetool-server.jar`)
    pub jar_path: Option<PathBuf>,

    /// Port of the local server; 0 picks a free port for every launch
    pub port: u16,

    /// How long to wait for the local server to answer
    pub startup_timeout_secs: u64,
}

impl Default for LanguageToolSettings {
    fn default() -> Self {
        Self {
            url: None,
            java_home: None,
            jar_path: None,
            port: 0,
            startup_timeout_secs: 60,
        }
    }
}

impl LanguageToolSettings {
    pub fn startup_timeout(&self) -> Duration {
        Duration::from_secs(self.startup_timeout_secs)
    }
}

/// Where run artifacts are written.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    pub dir: PathBuf,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("data/outputs"),
        }
    }
}
