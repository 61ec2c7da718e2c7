// SPDX-License-Identifier: MIT OR Apache-2.0

//! Vocabulary and inverse-document-frequency tables.
//!
//! Token identity is a dense `u32` position assigned in first-seen order over
//! the chunk corpus. The IDF table is indexed by the same positions and is
//! always built together with the vocabulary.

use std::collections::{HashMap, HashSet};
use std::fmt;

use tracing::debug;

/// Dense, zero-based token position.
pub type TermId = u32;

/// Token → position mapping, read-only after construction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Vocabulary {
    terms: Vec<String>,
    ids: HashMap<String, TermId>,
}

impl Vocabulary {
    /// Rebuilds a vocabulary from terms in position order.
    ///
    /// Returns `None` when a term appears twice.
    pub fn from_terms(terms: Vec<String>) -> Option<Self> {
        let mut ids = HashMap::with_capacity(terms.len());
        for (pos, term) in terms.iter().enumerate() {
            if ids.insert(term.clone(), pos as TermId).is_some() {
                return None;
            }
        }
        Some(Self { terms, ids })
    }

    pub fn get(&self, token: &str) -> Option<TermId> {
        self.ids.get(token).copied()
    }

    pub fn term(&self, id: TermId) -> Option<&str> {
        self.terms.get(id as usize).map(String::as_str)
    }

    /// Terms in position order.
    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    fn insert(&mut self, token: &str) -> TermId {
        if let Some(id) = self.ids.get(token) {
            return *id;
        }
        let id = self.terms.len() as TermId;
        self.terms.push(token.to_string());
        self.ids.insert(token.to_string(), id);
        id
    }
}

/// Position → IDF score, same cardinality as the vocabulary.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IdfTable {
    scores: Vec<f64>,
}

impl IdfTable {
    pub fn from_scores(scores: Vec<f64>) -> Self {
        Self { scores }
    }

    pub fn get(&self, id: TermId) -> Option<f64> {
        self.scores.get(id as usize).copied()
    }

    pub fn scores(&self) -> &[f64] {
        &self.scores
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}

/// Identifies one vocabulary/IDF build.
///
/// A blake3 digest over the ordered terms and the IDF bit patterns, so two
/// builds share a version exactly when both tables are identical.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VocabularyVersion(String);

impl VocabularyVersion {
    pub fn compute(vocabulary: &Vocabulary, idf: &IdfTable) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&(vocabulary.len() as u64).to_le_bytes());
        for term in vocabulary.terms() {
            hasher.update(&(term.len() as u64).to_le_bytes());
            hasher.update(term.as_bytes());
        }
        for score in idf.scores() {
            hasher.update(&score.to_bits().to_le_bytes());
        }
        Self(hasher.finalize().to_hex()[..32].to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VocabularyVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Builds the vocabulary and IDF table from tokenized chunks.
///
/// `idf(t) = ln(N / df(t)) + 1`, where `N` is the number of chunks and `df(t)`
/// the number of chunks containing `t`. Every score is at least 1.
pub fn build<S: AsRef<str>>(token_lists: &[Vec<S>]) -> (Vocabulary, IdfTable) {
    let mut vocabulary = Vocabulary::default();
    let mut doc_freq: Vec<u32> = Vec::new();

    for tokens in token_lists {
        let mut seen: HashSet<TermId> = HashSet::new();
        for token in tokens {
            let id = vocabulary.insert(token.as_ref());
            if id as usize == doc_freq.len() {
                doc_freq.push(0);
            }
            if seen.insert(id) {
                doc_freq[id as usize] += 1;
            }
        }
    }

    let n = token_lists.len() as f64;
    let scores = doc_freq
        .iter()
        .map(|&df| (n / df as f64).ln() + 1.0)
        .collect();

    debug!(
        chunks = token_lists.len(),
        terms = vocabulary.len(),
        "built vocabulary"
    );

    (vocabulary, IdfTable::from_scores(scores))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lists(raw: &[&[&str]]) -> Vec<Vec<String>> {
        raw.iter()
            .map(|l| l.iter().map(|s| s.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_first_seen_positions() {
        let (vocab, idf) = build(&lists(&[&["beta", "alpha", "beta"], &["gamma", "alpha"]]));
        assert_eq!(vocab.terms(), &["beta", "alpha", "gamma"]);
        assert_eq!(vocab.get("alpha"), Some(1));
        assert_eq!(vocab.term(2), Some("gamma"));
        assert_eq!(vocab.get("delta"), None);
        assert_eq!(idf.len(), vocab.len());
    }

    #[test]
    fn test_idf_formula() {
        let (vocab, idf) = build(&lists(&[&["shared", "one"], &["shared", "two"], &["shared"]]));
        let shared = idf.get(vocab.get("shared").unwrap()).unwrap();
        let one = idf.get(vocab.get("one").unwrap()).unwrap();

        assert!((shared - 1.0).abs() < 1e-12);
        assert!((one - (3.0_f64.ln() + 1.0)).abs() < 1e-12);
    }

    #[test]
    fn test_repeated_token_counts_once_per_chunk() {
        let (vocab, idf) = build(&lists(&[&["x", "x", "x"], &["y"]]));
        let x = idf.get(vocab.get("x").unwrap()).unwrap();
        assert!((x - (2.0_f64.ln() + 1.0)).abs() < 1e-12);
    }

    #[test]
    fn test_every_idf_is_positive() {
        let (_, idf) = build(&lists(&[&["a", "b"], &["a"], &["a", "c"]]));
        assert!(idf.scores().iter().all(|&s| s >= 1.0));
    }

    #[test]
    fn test_build_is_deterministic() {
        let input = lists(&[&["m", "n", "o"], &["o", "p"]]);
        let (v1, i1) = build(&input);
        let (v2, i2) = build(&input);
        assert_eq!(v1, v2);
        assert_eq!(i1, i2);
        assert_eq!(VocabularyVersion::compute(&v1, &i1), VocabularyVersion::compute(&v2, &i2));
    }

    #[test]
    fn test_version_changes_with_vocabulary_or_idf() {
        let (v1, i1) = build(&lists(&[&["a", "b"], &["b"]]));
        let (v2, i2) = build(&lists(&[&["a", "b"], &["b"], &["c"]]));
        let (v3, i3) = build(&lists(&[&["a", "b"], &["b"], &["b"]]));

        let base = VocabularyVersion::compute(&v1, &i1);
        assert_ne!(base, VocabularyVersion::compute(&v2, &i2));
        // Same terms, different document frequencies.
        assert_eq!(v1, v3);
        assert_ne!(base, VocabularyVersion::compute(&v3, &i3));
        assert_eq!(base.as_str().len(), 32);
    }

    #[test]
    fn test_from_terms_rejects_duplicates() {
        assert!(Vocabulary::from_terms(vec!["a".into(), "b".into()]).is_some());
        assert!(Vocabulary::from_terms(vec!["a".into(), "a".into()]).is_none());
    }
}
