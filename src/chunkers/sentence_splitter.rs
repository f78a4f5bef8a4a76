//! Language-aware sentence segmentation.

use lazy_static::lazy_static;
use regex::Regex;
use unicode_segmentation::UnicodeSegmentation;

use crate::types::Language;

/// Abbreviations that end with a period without ending the sentence.
const ENGLISH_ABBREVIATIONS: &[&str] = &[
    "mr.", "mrs.", "ms.", "dr.", "prof.", "sr.", "jr.", "st.", "mt.", "vs.", "etc.", "e.g.",
    "i.e.", "cf.", "approx.", "dept.", "fig.", "vol.", "inc.", "ltd.",
    "corp.", "jan.", "feb.", "mar.", "apr.", "jun.", "jul.", "aug.", "sep.", "sept.", "oct.",
    "nov.", "dec.", "u.s.", "u.k.",
];

const TURKISH_ABBREVIATIONS: &[&str] = &[
    "dr.", "prof.", "doç.", "yrd.", "öğr.", "av.", "alb.", "gen.", "vb.", "vs.", "bkz.",
    "örn.", "yy.", "sn.", "ltd.", "şti.", "a.ş.", "mah.", "cad.", "sok.", "apt.",
    "bl.", "m.ö.", "m.s.",
];

/// Abbreviations that are also ordinary words. They only continue the
/// sentence when the next word starts lowercase or with a digit.
const ENGLISH_AMBIGUOUS: &[&str] = &["no.", "co.", "est."];

const TURKISH_AMBIGUOUS: &[&str] = &["no.", "s."];

lazy_static! {
    static ref ORDINAL: Regex = Regex::new(r"^\d+\.$").expect("valid ordinal pattern");
    static ref INITIAL: Regex = Regex::new(r"^\p{Lu}\.$").expect("valid initial pattern");
}

/// Splits text into trimmed, non-empty sentences.
///
/// Candidate boundaries come from Unicode sentence segmentation (UAX #29).
/// A candidate is rejoined with the next one when it ends with a known
/// abbreviation. Words that double as abbreviations, and single-letter
/// initials, only rejoin when the next word starts lowercase or with a digit. Turkish text additionally keeps
/// ordinals such as `1. Dünya Savaşı` inside one sentence.
#[derive(Debug, Clone, Copy)]
pub struct SentenceTokenizer {
    language: Language,
    abbreviations: &'static [&'static str],
    ambiguous: &'static [&'static str],
}

impl SentenceTokenizer {
    pub fn new(language: Language) -> Self {
        let (abbreviations, ambiguous) = match language {
            Language::English => (ENGLISH_ABBREVIATIONS, ENGLISH_AMBIGUOUS),
            Language::Turkish => (TURKISH_ABBREVIATIONS, TURKISH_AMBIGUOUS),
        };
        Self {
            language,
            abbreviations,
            ambiguous,
        }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// Segment `text` into sentences, in order.
    pub fn sentences<'a>(&self, text: &'a str) -> Vec<&'a str> {
        let mut sentences = Vec::new();
        let mut start = 0;
        let mut end = 0;
        let mut pieces = text.split_sentence_bounds().peekable();

        while let Some(piece) = pieces.next() {
            end += piece.len();

            let continues = pieces
                .peek()
                .is_some_and(|next| self.is_false_boundary(&text[start..end], next));
            if continues {
                continue;
            }

            let sentence = text[start..end].trim();
            if !sentence.is_empty() {
                sentences.push(sentence);
            }
            start = end;
        }

        sentences
    }

    /// Whether the boundary after `segment` sits inside a sentence.
    fn is_false_boundary(&self, segment: &str, next: &str) -> bool {
        let trimmed = segment.trim_end();
        // Paragraph breaks always end a sentence.
        if segment[trimmed.len()..].contains("\n\n") {
            return false;
        }

        let Some(last_word) = trimmed.split_whitespace().last() else {
            return false;
        };
        let last_word = last_word.trim_start_matches(|c: char| "\"'([{“‘«".contains(c));
        if !last_word.ends_with('.') {
            return false;
        }

        let lowered = last_word.to_lowercase();
        if self.abbreviations.contains(&lowered.as_str()) {
            return true;
        }
        if self.ambiguous.contains(&lowered.as_str()) || INITIAL.is_match(last_word) {
            return next
                .trim_start()
                .starts_with(|c: char| c.is_lowercase() || c.is_numeric());
        }

        self.language == Language::Turkish
            && ORDINAL.is_match(last_word)
            && next.trim_start().starts_with(char::is_alphabetic)
    }
}

/// Convenience wrapper returning owned sentences.
pub fn split_sentences(text: &str, language: Language) -> Vec<String> {
    SentenceTokenizer::new(language)
        .sentences(text)
        .into_iter()
        .map(String::from)
        .collect()
}
