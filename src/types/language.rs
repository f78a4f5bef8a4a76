//! Supported document languages.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Language of the processed document.
///
/// The language picks the sentence-boundary rules, the prompt templates and
/// the grammar-correction strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    #[default]
    #[serde(rename = "en")]
    English,
    #[serde(rename = "tr")]
    Turkish,
}

impl Language {
    /// Parse a language code, rejecting anything unsupported.
    pub fn parse(code: &str) -> Result<Self, ConfigError> {
        match code.trim().to_lowercase().as_str() {
            "en" | "en-us" | "en-gb" | "english" => Ok(Language::English),
            "tr" | "tr-tr" | "turkish" => Ok(Language::Turkish),
            other => Err(ConfigError::UnsupportedLanguage(other.to_string())),
        }
    }

    /// Short ISO code.
    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Turkish => "tr",
        }
    }

    /// Language tag understood by LanguageTool.
    pub fn languagetool_code(&self) -> &'static str {
        match self {
            Language::English => "en-US",
            Language::Turkish => "tr-TR",
        }
    }
}

impl FromStr for Language {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
