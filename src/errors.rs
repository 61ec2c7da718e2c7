// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the retrieval core.

use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by chunking, indexing, persistence and retrieval.
///
/// Out-of-vocabulary tokens, zero-norm vectors and empty result sets are
/// ordinary outcomes and never appear here.
#[derive(Debug, Error)]
pub enum RetrievalError {
    /// No chunk was produced from any document at build time.
    #[error("corpus produced no chunks; nothing to index")]
    EmptyCorpus,

    /// The question was empty or whitespace-only.
    #[error("query is empty")]
    EmptyQuery,

    /// A persisted index does not match the expected format or vocabulary.
    #[error("index version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: String, found: String },

    /// Reading or writing index storage failed.
    #[error("index storage error at {}: {source}", path.display())]
    PersistenceIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Persisted data is malformed or internally inconsistent.
    #[error("corrupt index data: {0}")]
    Corrupt(String),

    /// Chunking or tokenizer settings violate their constraints.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The document directory does not exist.
    #[error("documents directory not found: {}", .0.display())]
    DocumentsNotFound(PathBuf),
}

impl RetrievalError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        RetrievalError::PersistenceIo {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, RetrievalError>;
