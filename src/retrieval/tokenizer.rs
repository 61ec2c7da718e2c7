// SPDX-License-Identifier: MIT OR Apache-2.0

//! Term normalization shared by index build and query time.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

/// Default minimum token length in characters.
pub const DEFAULT_MIN_TOKEN_LENGTH: usize = 2;

/// Default stopword list.
pub const DEFAULT_STOPWORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "been", "but", "by", "for", "from", "has", "have",
    "if", "in", "into", "is", "it", "its", "no", "not", "of", "on", "or", "so", "such", "that",
    "the", "their", "then", "there", "these", "they", "this", "to", "was", "were", "what",
    "which", "will", "with",
];

/// Runs of Unicode letters and digits. Underscore counts as a separator.
static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\W_]+").expect("valid regex"));

/// Lower-cases text, splits it on non-alphanumeric boundaries and drops short
/// tokens and stopwords.
#[derive(Debug, Clone)]
pub struct Tokenizer {
    min_token_length: usize,
    stopwords: HashSet<String>,
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new(
            DEFAULT_MIN_TOKEN_LENGTH,
            DEFAULT_STOPWORDS.iter().map(|s| s.to_string()),
        )
    }
}

impl Tokenizer {
    /// Creates a tokenizer. Stopwords are matched after lower-casing.
    pub fn new<I, S>(min_token_length: usize, stopwords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            min_token_length,
            stopwords: stopwords
                .into_iter()
                .map(|s| s.as_ref().to_lowercase())
                .collect(),
        }
    }

    pub fn min_token_length(&self) -> usize {
        self.min_token_length
    }

    pub fn is_stopword(&self, token: &str) -> bool {
        self.stopwords.contains(token)
    }

    /// Splits text into normalized tokens, in order of appearance.
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let lowered = text.to_lowercase();
        WORD_RE
            .find_iter(&lowered)
            .map(|m| m.as_str())
            .filter(|t| t.chars().count() >= self.min_token_length)
            .filter(|t| !self.stopwords.contains(*t))
            .map(str::to_string)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tokenization() {
        let tokenizer = Tokenizer::default();
        assert_eq!(
            tokenizer.tokenize("Machine learning is a subset of AI."),
            vec!["machine", "learning", "subset", "ai"]
        );
    }

    #[test]
    fn test_splits_on_punctuation_and_underscore() {
        let tokenizer = Tokenizer::new(1, Vec::<String>::new());
        assert_eq!(
            tokenizer.tokenize("on-demand snake_case x42,y"),
            vec!["on", "demand", "snake", "case", "x42", "y"]
        );
    }

    #[test]
    fn test_min_length_counts_characters() {
        let tokenizer = Tokenizer::new(3, Vec::<String>::new());
        assert_eq!(tokenizer.tokenize("ab été go über"), vec!["été", "über"]);
    }

    #[test]
    fn test_custom_stopwords_are_case_insensitive() {
        let tokenizer = Tokenizer::new(2, ["Cloud"]);
        assert!(tokenizer.is_stopword("cloud"));
        assert_eq!(tokenizer.tokenize("CLOUD computing"), vec!["computing"]);
    }

    #[test]
    fn test_default_stopwords_cover_documented_examples() {
        let tokenizer = Tokenizer::default();
        for word in ["the", "is", "at", "which", "on"] {
            assert!(tokenizer.is_stopword(word), "{word} should be a stopword");
        }
        assert!(tokenizer.tokenize("   \t\n").is_empty());
    }
}
