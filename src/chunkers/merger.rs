//! Sentence-level reassembly of transformed windows.

use std::collections::HashSet;

use tracing::debug;

use super::sentence_splitter::SentenceTokenizer;
use crate::types::Language;

/// Merges transformed windows into one document.
///
/// Each window is segmented into sentences in arrival order; a sentence is
/// kept only the first time its trimmed text appears. Deduplication is exact:
/// near-duplicates that differ by a single character (re-punctuated or
/// lightly reworded repeats from overlapping windows) are both kept.
#[derive(Debug, Clone, Copy)]
pub struct SentenceMerger {
    tokenizer: SentenceTokenizer,
}

impl SentenceMerger {
    pub fn new(language: Language) -> Self {
        Self {
            tokenizer: SentenceTokenizer::new(language),
        }
    }

    /// Merge windows in the given order. No windows yields an empty string.
    pub fn merge<S: AsRef<str>>(&self, windows: &[S]) -> String {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut merged: Vec<&str> = Vec::new();

        for (idx, window) in windows.iter().enumerate() {
            let before = merged.len();
            for sentence in self.tokenizer.sentences(window.as_ref()) {
                if seen.insert(sentence) {
                    merged.push(sentence);
                }
            }
            debug!(window = idx + 1, new_sentences = merged.len() - before, "Merged window");
        }

        let document = merged.join(" ");
        debug!(chars = document.chars().count(), "Final merged text length");
        document
    }
}

/// Merge transformed windows for `language`.
pub fn merge_windows<S: AsRef<str>>(windows: &[S], language: Language) -> String {
    SentenceMerger::new(language).merge(windows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunkers::WindowSplitter;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_no_windows_is_empty() {
        let windows: Vec<String> = Vec::new();
        assert_eq!(merge_windows(&windows, Language::English), "");
    }

    #[test]
    fn test_single_window_is_rejoined_unchanged() {
        let window = "First one.   Second one!\nThird one?";
        assert_eq!(
            merge_windows(&[window], Language::English),
            "First one. Second one! Third one?"
        );
    }

    #[test]
    fn test_shared_sentence_kept_once_in_first_position() {
        let windows = [
            "Alpha is first. Beta overlaps.",
            "Beta overlaps. Gamma is last.",
        ];
        assert_eq!(
            merge_windows(&windows, Language::English),
            "Alpha is first. Beta overlaps. Gamma is last."
        );
    }

    #[test]
    fn test_near_duplicates_are_both_kept() {
        let windows = ["The sky is blue.", "The sky is blue!"];
        assert_eq!(
            merge_windows(&windows, Language::English),
            "The sky is blue. The sky is blue!"
        );
    }

    #[test]
    fn test_duplicates_within_one_window_collapse() {
        let windows = ["Again. Again. Done."];
        assert_eq!(merge_windows(&windows, Language::English), "Again. Done.");
    }

    #[test]
    fn test_zero_overlap_identity_keeps_everything() {
        let text = "One fish swims. Two fish dive. Red fish rest. Blue fish hide.";
        let splitter = WindowSplitter::new(16, 0).unwrap();
        let windows: Vec<&str> = splitter.split(text).iter().map(|w| w.text).collect();

        let tokenizer = SentenceTokenizer::new(Language::English);
        let expected: Vec<&str> = windows
            .iter()
            .flat_map(|w| tokenizer.sentences(w))
            .collect();

        assert_eq!(merge_windows(&windows, Language::English), expected.join(" "));
    }

    #[test]
    fn test_overlapping_identity_windows_reassemble_sentences() {
        let text = "Cats purr. Dogs bark. Birds sing. Fish swim.";
        let splitter = WindowSplitter::new(22, 11).unwrap();
        let windows: Vec<&str> = splitter.split(text).iter().map(|w| w.text).collect();

        let merged = merge_windows(&windows, Language::English);
        for sentence in ["Cats purr.", "Dogs bark.", "Birds sing.", "Fish swim."] {
            assert_eq!(merged.matches(sentence).count(), 1, "{sentence} in {merged}");
        }
    }
}
