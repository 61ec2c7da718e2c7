// SPDX-License-Identifier: MIT OR Apache-2.0

//! Versioned on-disk format for [`IndexStore`].
//!
//! The index is written as JSON with an explicit schema that is independent
//! of the in-memory types:
//!
//! ```text
//! { "format": "askdocs-index", "format_version": 1,
//!   "vocabulary_version": "<32 hex>", "terms": [...], "idf": [...],
//!   "entries": [{ "source_id", "chunk_index", "start", "end", "text",
//!                 "positions": [...], "weights": [...], "norm" }] }
//! ```
//!
//! Floats are written in shortest round-trip form and parsed exactly, so a
//! save/load cycle reproduces every weight and norm bit for bit.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::errors::{Result, RetrievalError};
use crate::retrieval::chunker::Chunk;
use crate::retrieval::store::IndexStore;
use crate::retrieval::vectorizer::SparseVector;
use crate::retrieval::vocabulary::{IdfTable, TermId, Vocabulary, VocabularyVersion};

/// Format tag embedded in every index file.
pub const INDEX_FORMAT: &str = "askdocs-index";

/// Current on-disk schema version.
pub const INDEX_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Deserialize)]
struct Header {
    format: String,
    format_version: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct IndexFile {
    format: String,
    format_version: u32,
    vocabulary_version: String,
    terms: Vec<String>,
    idf: Vec<f64>,
    entries: Vec<EntryRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
struct EntryRecord {
    source_id: String,
    chunk_index: usize,
    start: usize,
    end: usize,
    text: String,
    positions: Vec<TermId>,
    weights: Vec<f64>,
    norm: f64,
}

impl IndexStore {
    /// Serializes the store into its versioned on-disk form.
    pub fn persist(&self) -> Result<Vec<u8>> {
        let file = IndexFile {
            format: INDEX_FORMAT.to_string(),
            format_version: INDEX_FORMAT_VERSION,
            vocabulary_version: self.version().to_string(),
            terms: self.vocabulary().terms().to_vec(),
            idf: self.idf().scores().to_vec(),
            entries: self
                .entries()
                .iter()
                .map(|entry| {
                    let chunk = entry.chunk();
                    let (positions, weights) = entry.vector().entries().iter().copied().unzip();
                    EntryRecord {
                        source_id: chunk.source_id.clone(),
                        chunk_index: chunk.index,
                        start: chunk.start,
                        end: chunk.end,
                        text: chunk.text.clone(),
                        positions,
                        weights,
                        norm: entry.norm(),
                    }
                })
                .collect(),
        };

        serde_json::to_vec(&file).map_err(|e| RetrievalError::Corrupt(e.to_string()))
    }

    /// Restores a store from its serialized form.
    ///
    /// When `expected` is given, the persisted vocabulary version must equal
    /// it; otherwise the load fails with [`RetrievalError::VersionMismatch`].
    pub fn load(bytes: &[u8], expected: Option<&VocabularyVersion>) -> Result<Self> {
        let header: Header = serde_json::from_slice(bytes)
            .map_err(|e| RetrievalError::Corrupt(format!("unreadable header: {e}")))?;
        if header.format != INDEX_FORMAT {
            return Err(RetrievalError::Corrupt(format!(
                "unknown format tag '{}'",
                header.format
            )));
        }
        if header.format_version != INDEX_FORMAT_VERSION {
            return Err(RetrievalError::VersionMismatch {
                expected: format!("format v{INDEX_FORMAT_VERSION}"),
                found: format!("format v{}", header.format_version),
            });
        }

        let file: IndexFile =
            serde_json::from_slice(bytes).map_err(|e| RetrievalError::Corrupt(e.to_string()))?;

        if file.terms.len() != file.idf.len() {
            return Err(RetrievalError::Corrupt(format!(
                "{} terms but {} idf scores",
                file.terms.len(),
                file.idf.len()
            )));
        }
        if file.idf.iter().any(|s| !s.is_finite() || *s <= 0.0) {
            return Err(RetrievalError::Corrupt("non-positive idf score".into()));
        }
        let vocabulary = Vocabulary::from_terms(file.terms)
            .ok_or_else(|| RetrievalError::Corrupt("duplicate vocabulary term".into()))?;
        let idf = IdfTable::from_scores(file.idf);

        let version = VocabularyVersion::compute(&vocabulary, &idf);
        if version.as_str() != file.vocabulary_version {
            return Err(RetrievalError::Corrupt(format!(
                "vocabulary tag {} does not match contents ({version})",
                file.vocabulary_version
            )));
        }
        if let Some(expected) = expected {
            if expected != &version {
                return Err(RetrievalError::VersionMismatch {
                    expected: expected.to_string(),
                    found: version.to_string(),
                });
            }
        }

        let vocab_len = vocabulary.len();
        let entries = file
            .entries
            .into_iter()
            .enumerate()
            .map(|(i, record)| decode_entry(i, record, vocab_len))
            .collect::<Result<Vec<_>>>()?;

        debug!(entries = entries.len(), terms = vocab_len, %version, "loaded index");
        Ok(IndexStore::from_parts(vocabulary, idf, version, entries))
    }

    /// Writes the store to `path`, replacing any previous file atomically.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let bytes = self.persist()?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| RetrievalError::io(parent, e))?;
        }

        let tmp = temp_path(path);
        if let Err(e) = write_file(&tmp, &bytes) {
            let _ = fs::remove_file(&tmp);
            return Err(e);
        }
        fs::rename(&tmp, path).map_err(|e| {
            let _ = fs::remove_file(&tmp);
            RetrievalError::io(path, e)
        })?;

        info!(path = %path.display(), entries = self.len(), "saved index");
        Ok(())
    }

    /// Reads and validates a store previously written with [`IndexStore::save`].
    pub fn open(path: impl AsRef<Path>, expected: Option<&VocabularyVersion>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|e| RetrievalError::io(path, e))?;
        Self::load(&bytes, expected)
    }
}

fn decode_entry(
    i: usize,
    record: EntryRecord,
    vocab_len: usize,
) -> Result<(Chunk, SparseVector, f64)> {
    if record.positions.len() != record.weights.len() {
        return Err(RetrievalError::Corrupt(format!(
            "entry {i}: {} positions but {} weights",
            record.positions.len(),
            record.weights.len()
        )));
    }
    if record.positions.iter().any(|&p| p as usize >= vocab_len) {
        return Err(RetrievalError::Corrupt(format!(
            "entry {i}: position outside vocabulary of {vocab_len} terms"
        )));
    }
    let vector = SparseVector::from_sorted(record.positions.into_iter().zip(record.weights).collect())
        .ok_or_else(|| RetrievalError::Corrupt(format!("entry {i}: malformed vector")))?;
    if vector.norm().to_bits() != record.norm.to_bits() {
        return Err(RetrievalError::Corrupt(format!(
            "entry {i}: stored norm {} does not match vector",
            record.norm
        )));
    }

    let chunk = Chunk {
        source_id: record.source_id,
        index: record.chunk_index,
        start: record.start,
        end: record.end,
        text: record.text,
    };
    Ok((chunk, vector, record.norm))
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    let file = fs::File::create(path).map_err(|e| RetrievalError::io(path, e))?;
    let mut writer = BufWriter::new(file);
    writer
        .write_all(bytes)
        .and_then(|_| writer.flush())
        .map_err(|e| RetrievalError::io(path, e))?;
    writer
        .get_ref()
        .sync_all()
        .map_err(|e| RetrievalError::io(path, e))
}
