// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory TF-IDF index with brute-force cosine similarity search.
//!
//! The store owns the vocabulary and IDF table its vectors were built with,
//! so query vectors produced through [`IndexStore::vectorize`] always live in
//! the same vocabulary version as the stored entries.

use serde::Serialize;
use tracing::debug;

use crate::errors::{Result, RetrievalError};
use crate::retrieval::chunker::Chunk;
use crate::retrieval::vectorizer::{self, SparseVector};
use crate::retrieval::vocabulary::{IdfTable, Vocabulary, VocabularyVersion};

/// A chunk together with its vector and precomputed norm.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexEntry {
    chunk: Chunk,
    vector: SparseVector,
    norm: f64,
}

impl IndexEntry {
    pub fn chunk(&self) -> &Chunk {
        &self.chunk
    }

    pub fn vector(&self) -> &SparseVector {
        &self.vector
    }

    pub fn norm(&self) -> f64 {
        self.norm
    }
}

/// A ranked hit from [`IndexStore::search`].
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult<'a> {
    /// The matching chunk
    pub chunk: &'a Chunk,
    /// Cosine similarity score (0.0 to 1.0)
    pub score: f64,
    /// 1-based rank
    pub rank: usize,
}

impl SearchResult<'_> {
    /// Owned copy for handing to the prompting layer.
    pub fn to_passage(&self) -> Passage {
        Passage {
            chunk_text: self.chunk.text.clone(),
            source_id: self.chunk.source_id.clone(),
            chunk_index: self.chunk.index,
            similarity_score: self.score,
            rank: self.rank,
        }
    }
}

/// A retrieved passage, detached from the index it came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Passage {
    pub chunk_text: String,
    pub source_id: String,
    pub chunk_index: usize,
    pub similarity_score: f64,
    pub rank: usize,
}

/// Ordered collection of index entries plus the vocabulary they were built with.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexStore {
    vocabulary: Vocabulary,
    idf: IdfTable,
    version: VocabularyVersion,
    entries: Vec<IndexEntry>,
}

impl IndexStore {
    /// Creates an empty store over a vocabulary and its IDF table.
    ///
    /// Fails with [`RetrievalError::Corrupt`] unless both have one slot per term.
    pub fn new(vocabulary: Vocabulary, idf: IdfTable) -> Result<Self> {
        if vocabulary.len() != idf.len() {
            return Err(RetrievalError::Corrupt(format!(
                "{} terms but {} idf scores",
                vocabulary.len(),
                idf.len()
            )));
        }
        let version = VocabularyVersion::compute(&vocabulary, &idf);
        Ok(Self {
            vocabulary,
            idf,
            version,
            entries: Vec::new(),
        })
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn idf(&self) -> &IdfTable {
        &self.idf
    }

    pub fn version(&self) -> &VocabularyVersion {
        &self.version
    }

    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of distinct source documents.
    pub fn source_count(&self) -> usize {
        let mut sources: Vec<&str> = self
            .entries
            .iter()
            .map(|e| e.chunk.source_id.as_str())
            .collect();
        sources.sort_unstable();
        sources.dedup();
        sources.len()
    }

    /// Vectorizes tokens against this store's vocabulary and IDF table.
    pub fn vectorize<S: AsRef<str>>(&self, tokens: &[S]) -> SparseVector {
        vectorizer::vectorize(tokens, &self.vocabulary, &self.idf)
    }

    /// Appends an entry. A zero vector is stored with norm 0 and never matches.
    ///
    /// Vectors referring to positions outside the vocabulary are rejected.
    pub fn add(&mut self, chunk: Chunk, vector: SparseVector) -> Result<()> {
        if let Some(position) = vector.max_position() {
            if position as usize >= self.vocabulary.len() {
                return Err(RetrievalError::Corrupt(format!(
                    "vector position {position} outside vocabulary of {} terms",
                    self.vocabulary.len()
                )));
            }
        }
        let norm = vector.norm();
        self.entries.push(IndexEntry {
            chunk,
            vector,
            norm,
        });
        Ok(())
    }

    /// Returns up to `k` entries ranked by cosine similarity to `query`.
    ///
    /// Sorted by descending score; equal scores keep insertion order.
    pub fn search(&self, query: &SparseVector, k: usize) -> Vec<SearchResult<'_>> {
        if k == 0 || self.entries.is_empty() {
            return Vec::new();
        }

        let query_norm = query.norm();
        let mut scored: Vec<(usize, f64)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(pos, entry)| {
                let score = vectorizer::cosine(query, query_norm, &entry.vector, entry.norm);
                (pos, score)
            })
            .collect();

        scored.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        scored.truncate(k);

        debug!(
            entries = self.entries.len(),
            query_terms = query.len(),
            returned = scored.len(),
            "searched index"
        );

        scored
            .into_iter()
            .enumerate()
            .map(|(i, (pos, score))| SearchResult {
                chunk: &self.entries[pos].chunk,
                score,
                rank: i + 1,
            })
            .collect()
    }

    /// Reassembles a store from already validated parts.
    pub(crate) fn from_parts(
        vocabulary: Vocabulary,
        idf: IdfTable,
        version: VocabularyVersion,
        entries: Vec<(Chunk, SparseVector, f64)>,
    ) -> Self {
        Self {
            vocabulary,
            idf,
            version,
            entries: entries
                .into_iter()
                .map(|(chunk, vector, norm)| IndexEntry {
                    chunk,
                    vector,
                    norm,
                })
                .collect(),
        }
    }
}
