// SPDX-License-Identifier: MIT OR Apache-2.0

//! Retrieval core - chunking, TF-IDF vectors and similarity search
//!
//! Documents are split into overlapping chunks, a vocabulary and IDF table
//! are built over all chunks, and each chunk becomes a sparse TF-IDF vector
//! in an [`IndexStore`]. Questions are vectorized against the same vocabulary
//! and ranked by cosine similarity. An [`AccessPolicy`] can hide sources from
//! roles after ranking.

pub mod access;
pub mod chunker;
pub mod persist;
pub mod retriever;
pub mod shared;
pub mod store;
pub mod tokenizer;
pub mod vectorizer;
pub mod vocabulary;

pub use access::{AccessPolicy, DEFAULT_ROLE};
pub use chunker::{Chunk, ChunkConfig, Chunker, Document};
pub use persist::{INDEX_FORMAT, INDEX_FORMAT_VERSION};
pub use retriever::{RetrievalConfig, Retriever, DEFAULT_TOP_K};
pub use shared::SharedIndex;
pub use store::{IndexEntry, IndexStore, Passage, SearchResult};
pub use tokenizer::Tokenizer;
pub use vectorizer::SparseVector;
pub use vocabulary::{IdfTable, TermId, Vocabulary, VocabularyVersion};
