//! Readability scoring.

use lazy_static::lazy_static;
use regex::Regex;
use unicode_segmentation::UnicodeSegmentation;

use crate::chunkers::SentenceTokenizer;
use crate::types::{Language, ReadabilityScores, ScoreValue};

lazy_static! {
    static ref VOWEL_GROUP: Regex = Regex::new(r"[aeiouyâîûıöüéèêàäëï]+").expect("valid vowel pattern");
}

/// Scores a finished document.
pub trait ReadabilityScorer: Send + Sync {
    fn score(&self, text: &str) -> ReadabilityScores;
}

/// Proficiency band for a grade level.
pub fn cefr_band(grade: f64) -> &'static str {
    if grade < 5.0 {
        "A1-A2"
    } else if grade < 8.0 {
        "B1"
    } else if grade < 11.0 {
        "B2"
    } else if grade < 14.0 {
        "C1"
    } else {
        "C2"
    }
}

/// Estimate syllables by counting vowel groups.
pub fn count_syllables(word: &str, language: Language) -> usize {
    let lowered = word.to_lowercase();
    let mut count = VOWEL_GROUP.find_iter(&lowered).count();

    // Silent trailing "e" in English ("make", but not "the" or "table").
    if language == Language::English
        && count > 1
        && lowered.ends_with('e')
        && !lowered.ends_with("le")
        && !lowered.ends_with("ee")
    {
        count -= 1;
    }

    count.max(1)
}

/// Raw counts a score is computed from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TextStatistics {
    pub sentences: usize,
    pub words: usize,
    pub syllables: usize,
    pub polysyllables: usize,
    pub letters: usize,
}

/// Classic formula-based readability metrics.
#[derive(Debug, Clone, Copy)]
pub struct TextStatScorer {
    tokenizer: SentenceTokenizer,
}

impl TextStatScorer {
    pub fn new(language: Language) -> Self {
        Self {
            tokenizer: SentenceTokenizer::new(language),
        }
    }

    pub fn statistics(&self, text: &str) -> TextStatistics {
        let language = self.tokenizer.language();
        let mut stats = TextStatistics {
            sentences: self.tokenizer.sentences(text).len(),
            ..Default::default()
        };

        for word in text.unicode_words() {
            let syllables = count_syllables(word, language);
            stats.words += 1;
            stats.syllables += syllables;
            if syllables >= 3 {
                stats.polysyllables += 1;
            }
            stats.letters += word.chars().filter(|c| c.is_alphanumeric()).count();
        }

        stats
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

impl ReadabilityScorer for TextStatScorer {
    fn score(&self, text: &str) -> ReadabilityScores {
        let stats = self.statistics(text);
        let mut scores = ReadabilityScores::new();

        let (reading_ease, grade, smog, ari, coleman_liau) = if stats.words == 0 {
            (0.0, 0.0, 0.0, 0.0, 0.0)
        } else {
            let words = stats.words as f64;
            let sentences = stats.sentences.max(1) as f64;
            let words_per_sentence = words / sentences;
            let syllables_per_word = stats.syllables as f64 / words;
            let letters_per_word = stats.letters as f64 / words;

            (
                206.835 - 1.015 * words_per_sentence - 84.6 * syllables_per_word,
                0.39 * words_per_sentence + 11.8 * syllables_per_word - 15.59,
                1.0430 * (stats.polysyllables as f64 * 30.0 / sentences).sqrt() + 3.1291,
                4.71 * letters_per_word + 0.5 * words_per_sentence - 21.43,
                0.0588 * (letters_per_word * 100.0) - 0.296 * (sentences / words * 100.0) - 15.8,
            )
        };

        scores.insert("flesch_reading_ease".into(), ScoreValue::Number(round2(reading_ease)));
        scores.insert("flesch_kincaid_grade".into(), ScoreValue::Number(round2(grade)));
        scores.insert("smog_index".into(), ScoreValue::Number(round2(smog)));
        scores.insert("automated_readability_index".into(), ScoreValue::Number(round2(ari)));
        scores.insert("coleman_liau_index".into(), ScoreValue::Number(round2(coleman_liau)));
        scores.insert("cefr_estimate".into(), ScoreValue::Label(cefr_band(grade).to_string()));
        scores
    }
}
