//! Overlapping window splitter.

use tracing::debug;

use crate::error::ConfigError;

/// A contiguous slice of a document sized to a context budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window<'a> {
    /// Position of this window in split order (0-indexed)
    pub index: usize,

    /// Offset of the first character, counted in characters
    pub start: usize,

    /// The window's text
    pub text: &'a str,
}

impl<'a> Window<'a> {
    /// Length in characters.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    /// Offset one past the last character.
    pub fn end(&self) -> usize {
        self.start + self.char_len()
    }
}

/// Splits text into windows of `window_size_chars` characters, each starting
/// `window_size_chars - overlap_chars` characters after the previous one.
///
/// Offsets count Unicode scalar values, so a window never ends inside a
/// multi-byte character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSplitter {
    window_size_chars: usize,
    overlap_chars: usize,
}

impl WindowSplitter {
    /// Create a splitter. Requires `0 <= overlap_chars < window_size_chars`.
    pub fn new(window_size_chars: usize, overlap_chars: usize) -> Result<Self, ConfigError> {
        if window_size_chars == 0 {
            return Err(ConfigError::InvalidBudget(
                "window size must be at least one character".to_string(),
            ));
        }
        if overlap_chars >= window_size_chars {
            return Err(ConfigError::InvalidBudget(format!(
                "overlap ({overlap_chars}) must be smaller than the window ({window_size_chars})"
            )));
        }
        Ok(Self {
            window_size_chars,
            overlap_chars,
        })
    }

    pub fn window_size_chars(&self) -> usize {
        self.window_size_chars
    }

    pub fn overlap_chars(&self) -> usize {
        self.overlap_chars
    }

    /// Distance between consecutive window starts; always at least 1.
    pub fn step(&self) -> usize {
        self.window_size_chars - self.overlap_chars
    }

    /// Split `text` into overlapping windows. Empty text yields no windows.
    pub fn split<'a>(&self, text: &'a str) -> Vec<Window<'a>> {
        // Byte offset of every character boundary, including the end of text.
        let boundaries: Vec<usize> = text
            .char_indices()
            .map(|(offset, _)| offset)
            .chain(std::iter::once(text.len()))
            .collect();
        let total_chars = boundaries.len() - 1;

        let windows: Vec<Window<'a>> = (0..total_chars)
            .step_by(self.step())
            .enumerate()
            .map(|(index, start)| {
                let end = (start + self.window_size_chars).min(total_chars);
                Window {
                    index,
                    start,
                    text: &text[boundaries[start]..boundaries[end]],
                }
            })
            .collect();

        debug!(
            windows = windows.len(),
            window_size = self.window_size_chars,
            overlap = self.overlap_chars,
            "Split text into windows"
        );

        windows
    }
}
