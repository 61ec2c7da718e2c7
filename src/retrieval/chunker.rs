// SPDX-License-Identifier: MIT OR Apache-2.0

//! Sentence-aware document chunker.
//!
//! Splits a document into overlapping character windows. Each window tries to
//! end right after a sentence terminator or paragraph break close to the size
//! limit, and falls back to a hard cut when none is found.

use serde::{Deserialize, Serialize};

use crate::errors::{Result, RetrievalError};

/// Default maximum characters per chunk.
pub const DEFAULT_MAX_CHUNK_CHARS: usize = 500;

/// Default overlap between consecutive chunks, in characters.
pub const DEFAULT_CHUNK_OVERLAP_CHARS: usize = 50;

/// Default look-back window for a sentence boundary, in characters.
pub const DEFAULT_BOUNDARY_SLACK_CHARS: usize = 100;

/// A source document handed to the indexer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Source identifier (usually the file name).
    pub source_id: String,
    /// Raw document text.
    pub text: String,
}

impl Document {
    pub fn new(source_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            source_id: source_id.into(),
            text: text.into(),
        }
    }
}

/// Configuration for the chunker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkConfig {
    /// Maximum window size in characters.
    pub max_chars: usize,
    /// Characters shared by consecutive windows.
    pub overlap_chars: usize,
    /// How far back from the hard limit a sentence boundary may be taken.
    pub boundary_slack_chars: usize,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            max_chars: DEFAULT_MAX_CHUNK_CHARS,
            overlap_chars: DEFAULT_CHUNK_OVERLAP_CHARS,
            boundary_slack_chars: DEFAULT_BOUNDARY_SLACK_CHARS,
        }
    }
}

impl ChunkConfig {
    /// Creates a new ChunkConfig with the default boundary slack.
    pub fn new(max_chars: usize, overlap_chars: usize) -> Result<Self> {
        let config = Self {
            max_chars,
            overlap_chars,
            boundary_slack_chars: DEFAULT_BOUNDARY_SLACK_CHARS.min(max_chars.saturating_sub(1)),
        };
        config.validate()?;
        Ok(config)
    }

    /// Sets the boundary slack window.
    pub fn with_boundary_slack(mut self, slack: usize) -> Result<Self> {
        self.boundary_slack_chars = slack;
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_chars == 0 {
            return Err(RetrievalError::InvalidConfig(
                "max_chunk_chars must be greater than 0".into(),
            ));
        }
        if self.overlap_chars >= self.max_chars {
            return Err(RetrievalError::InvalidConfig(format!(
                "chunk_overlap_chars ({}) must be less than max_chunk_chars ({})",
                self.overlap_chars, self.max_chars
            )));
        }
        if self.boundary_slack_chars >= self.max_chars {
            return Err(RetrievalError::InvalidConfig(format!(
                "boundary_slack_chars ({}) must be less than max_chunk_chars ({})",
                self.boundary_slack_chars, self.max_chars
            )));
        }
        Ok(())
    }
}

/// A bounded, possibly overlapping window of one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Source document identifier.
    pub source_id: String,
    /// Position of this chunk within its document (0-based).
    pub index: usize,
    /// Window start, in characters from the start of the document.
    pub start: usize,
    /// Window end (exclusive), in characters.
    pub end: usize,
    /// Window text with surrounding whitespace trimmed.
    pub text: String,
}

/// Splits documents into overlapping, sentence-aware chunks.
#[derive(Debug, Clone, Default)]
pub struct Chunker {
    config: ChunkConfig,
}

impl Chunker {
    /// Creates a new chunker, rejecting configurations that fail
    /// [`ChunkConfig::validate`].
    pub fn new(config: ChunkConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Creates a chunker with default configuration.
    pub fn with_defaults() -> Self {
        Self::default()
    }

    /// Returns the current configuration.
    pub fn config(&self) -> &ChunkConfig {
        &self.config
    }

    /// Splits a document into chunks.
    ///
    /// Algorithm:
    /// ```text
    /// start = 0
    /// loop:
    ///   if n - start <= max: end = n
    ///   else: end = last boundary in [start + max - slack, start + max], or start + max
    ///   emit trim(text[start..end]) unless empty
    ///   if end == n: stop
    ///   start = end - overlap, or end when that would not move forward
    /// ```
    pub fn chunk(&self, document: &Document) -> Vec<Chunk> {
        let chars: Vec<char> = document.text.chars().collect();
        let total = chars.len();
        if chars.iter().all(|c| c.is_whitespace()) {
            return Vec::new();
        }

        let max = self.config.max_chars;
        let overlap = self.config.overlap_chars;
        let mut chunks = Vec::new();
        let mut start = 0_usize;

        loop {
            let end = if total - start <= max {
                total
            } else {
                self.find_boundary(&chars, start).unwrap_or(start + max)
            };

            let window: String = chars[start..end].iter().collect();
            let text = window.trim();
            if !text.is_empty() {
                chunks.push(Chunk {
                    source_id: document.source_id.clone(),
                    index: chunks.len(),
                    start,
                    end,
                    text: text.to_string(),
                });
            }

            if end >= total {
                break;
            }

            // Never step back to or before the previous start.
            let next = end.saturating_sub(overlap);
            start = if next > start { next } else { end };
        }

        chunks
    }

    /// Chunks several documents in order.
    pub fn chunk_all(&self, documents: &[Document]) -> Vec<Chunk> {
        documents.iter().flat_map(|doc| self.chunk(doc)).collect()
    }

    /// Returns the end position of the last sentence or paragraph boundary whose
    /// end lies inside `[start + max - slack, start + max]`.
    fn find_boundary(&self, chars: &[char], start: usize) -> Option<usize> {
        let hard = start + self.config.max_chars;
        let lowest = (hard - self.config.boundary_slack_chars).max(start + 1);

        (lowest..=hard).rev().find(|&end| {
            let last = chars[end - 1];
            matches!(last, '.' | '!' | '?')
                || (last == '\n' && end >= 2 && end - 2 >= start && chars[end - 2] == '\n')
        })
    }
}
