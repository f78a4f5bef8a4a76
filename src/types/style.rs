//! Target styles and generation intents.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A rewrite style produced for every document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Style {
    Academic,
    Simple,
    Children,
}

impl Style {
    /// The fixed style set, in output order.
    pub const ALL: [Style; 3] = [Style::Academic, Style::Simple, Style::Children];

    /// Key used for outputs and artifact names.
    pub fn key(&self) -> &'static str {
        match self {
            Style::Academic => "academic",
            Style::Simple => "simple",
            Style::Children => "children",
        }
    }

    /// Label embedded in the rewrite instruction.
    pub fn label(&self) -> &'static str {
        match self {
            Style::Academic => "academic",
            Style::Simple => "simple",
            Style::Children => "child-friendly",
        }
    }

    /// Resolve a style by key or label.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|style| style.key() == name || style.label() == name)
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// What a generation request asks the backend to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intent {
    /// Rewrite a window in the given style.
    Rewrite(Style),
    /// Fix spelling and grammar of a single sentence.
    GrammarFix,
}

impl Intent {
    /// Label sent to the backend alongside the prompt.
    pub fn label(&self) -> &'static str {
        match self {
            Intent::Rewrite(style) => style.label(),
            Intent::GrammarFix => "grammar",
        }
    }
}

impl From<Style> for Intent {
    fn from(style: Style) -> Self {
        Intent::Rewrite(style)
    }
}
