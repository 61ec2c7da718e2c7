// SPDX-License-Identifier: MIT OR Apache-2.0

//! Build-time and query-time coordination of the retrieval pipeline.

use rayon::prelude::*;
use tracing::{debug, info};

use crate::errors::{Result, RetrievalError};
use crate::retrieval::access::AccessPolicy;
use crate::retrieval::chunker::{Chunk, ChunkConfig, Chunker, Document};
use crate::retrieval::store::{IndexStore, SearchResult};
use crate::retrieval::tokenizer::Tokenizer;
use crate::retrieval::vectorizer;
use crate::retrieval::vocabulary::{self, VocabularyVersion};

/// Default number of passages returned per question.
pub const DEFAULT_TOP_K: usize = 3;

/// Settings shared by index build and retrieval.
#[derive(Debug, Clone)]
pub struct RetrievalConfig {
    pub chunking: ChunkConfig,
    pub tokenizer: Tokenizer,
    pub top_k_default: usize,
    pub access: AccessPolicy,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            chunking: ChunkConfig::default(),
            tokenizer: Tokenizer::default(),
            top_k_default: DEFAULT_TOP_K,
            access: AccessPolicy::default(),
        }
    }
}

/// Drives chunking, vocabulary construction, vectorization and search.
///
/// Holds no index state of its own; every call works on the store it is given.
#[derive(Debug, Clone)]
pub struct Retriever {
    chunker: Chunker,
    tokenizer: Tokenizer,
    top_k_default: usize,
    access: AccessPolicy,
}

impl Default for Retriever {
    fn default() -> Self {
        Self {
            chunker: Chunker::with_defaults(),
            tokenizer: Tokenizer::default(),
            top_k_default: DEFAULT_TOP_K,
            access: AccessPolicy::default(),
        }
    }
}

impl Retriever {
    pub fn new(config: RetrievalConfig) -> Result<Self> {
        let chunker = Chunker::new(config.chunking)?;
        if config.top_k_default == 0 {
            return Err(RetrievalError::InvalidConfig(
                "top_k_default must be at least 1".into(),
            ));
        }
        Ok(Self {
            chunker,
            tokenizer: config.tokenizer,
            top_k_default: config.top_k_default,
            access: config.access,
        })
    }

    pub fn tokenizer(&self) -> &Tokenizer {
        &self.tokenizer
    }

    pub fn top_k_default(&self) -> usize {
        self.top_k_default
    }

    pub fn access(&self) -> &AccessPolicy {
        &self.access
    }

    /// Builds a complete index from documents, in input order.
    ///
    /// Fails with [`RetrievalError::EmptyCorpus`] when no document yields a chunk.
    pub fn build_index(&self, documents: &[Document]) -> Result<IndexStore> {
        let chunks = self.chunker.chunk_all(documents);
        if chunks.is_empty() {
            return Err(RetrievalError::EmptyCorpus);
        }
        debug!(documents = documents.len(), chunks = chunks.len(), "chunked corpus");

        let token_lists = self.tokenize_chunks(&chunks);
        let (vocab, idf) = vocabulary::build(&token_lists);

        let vectors: Vec<_> = token_lists
            .par_iter()
            .map(|tokens| vectorizer::vectorize(tokens, &vocab, &idf))
            .collect();

        let mut store = IndexStore::new(vocab, idf)?;
        for (chunk, vector) in chunks.into_iter().zip(vectors) {
            store.add(chunk, vector)?;
        }

        info!(
            documents = documents.len(),
            chunks = store.len(),
            terms = store.vocabulary().len(),
            version = %store.version(),
            "built index"
        );
        Ok(store)
    }

    /// Returns the vocabulary version a fresh build of `documents` would have.
    pub fn vocabulary_version(&self, documents: &[Document]) -> Result<VocabularyVersion> {
        let chunks = self.chunker.chunk_all(documents);
        if chunks.is_empty() {
            return Err(RetrievalError::EmptyCorpus);
        }
        let (vocab, idf) = vocabulary::build(&self.tokenize_chunks(&chunks));
        Ok(VocabularyVersion::compute(&vocab, &idf))
    }

    /// Fails with [`RetrievalError::VersionMismatch`] unless `store` was built
    /// from exactly this vocabulary of `documents`.
    pub fn check_compatible(&self, store: &IndexStore, documents: &[Document]) -> Result<()> {
        let current = self.vocabulary_version(documents)?;
        if &current != store.version() {
            return Err(RetrievalError::VersionMismatch {
                expected: current.to_string(),
                found: store.version().to_string(),
            });
        }
        Ok(())
    }

    /// Returns the `k` chunks most similar to `question`.
    ///
    /// A blank question is rejected before the store is consulted.
    pub fn retrieve<'s>(
        &self,
        store: &'s IndexStore,
        question: &str,
        k: usize,
    ) -> Result<Vec<SearchResult<'s>>> {
        if question.trim().is_empty() {
            return Err(RetrievalError::EmptyQuery);
        }
        let tokens = self.tokenizer.tokenize(question);
        let query = store.vectorize(&tokens);
        debug!(tokens = tokens.len(), matched_terms = query.len(), k, "retrieving");
        Ok(store.search(&query, k))
    }

    /// Like [`Retriever::retrieve`], then drops passages `role` may not see.
    ///
    /// The top `k` are selected before filtering, so fewer may be returned.
    pub fn retrieve_for_role<'s>(
        &self,
        store: &'s IndexStore,
        question: &str,
        k: usize,
        role: &str,
    ) -> Result<Vec<SearchResult<'s>>> {
        let results = self.retrieve(store, question, k)?;
        let found = results.len();
        let visible = self.access.filter(role, results);
        debug!(role, found, visible = visible.len(), "applied access policy");
        Ok(visible)
    }

    /// Tokenizes chunk texts in parallel, preserving chunk order.
    fn tokenize_chunks(&self, chunks: &[Chunk]) -> Vec<Vec<String>> {
        chunks
            .par_iter()
            .map(|chunk| self.tokenizer.tokenize(&chunk.text))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus() -> Vec<Document> {
        vec![
            Document::new("ml.txt", "Machine learning is a subset of AI."),
            Document::new("cloud.txt", "Cloud computing provides on-demand resources."),
        ]
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let mut config = RetrievalConfig::default();
        config.chunking.overlap_chars = config.chunking.max_chars;
        assert!(matches!(Retriever::new(config), Err(RetrievalError::InvalidConfig(_))));

        let config = RetrievalConfig {
            top_k_default: 0,
            ..Default::default()
        };
        assert!(matches!(Retriever::new(config), Err(RetrievalError::InvalidConfig(_))));
    }

    #[test]
    fn test_build_is_reproducible() {
        let retriever = Retriever::default();
        let a = retriever.build_index(&corpus()).unwrap();
        let b = retriever.build_index(&corpus()).unwrap();
        assert_eq!(a, b);
        assert_eq!(retriever.vocabulary_version(&corpus()).unwrap(), *a.version());
    }

    #[test]
    fn test_empty_corpus() {
        let retriever = Retriever::default();
        assert!(matches!(retriever.build_index(&[]), Err(RetrievalError::EmptyCorpus)));
        let blank = vec![Document::new("blank.txt", "  \n ")];
        assert!(matches!(retriever.build_index(&blank), Err(RetrievalError::EmptyCorpus)));
    }

    #[test]
    fn test_blank_question_rejected() {
        let retriever = Retriever::default();
        let store = retriever.build_index(&corpus()).unwrap();
        for q in ["", "   ", "\n\t"] {
            assert!(matches!(retriever.retrieve(&store, q, 1), Err(RetrievalError::EmptyQuery)));
        }
    }

    #[test]
    fn test_stopword_only_question_scores_zero() {
        let retriever = Retriever::default();
        let store = retriever.build_index(&corpus()).unwrap();
        let results = retriever.retrieve(&store, "what is the", 2).unwrap();
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.score == 0.0));
        assert_eq!(results[0].chunk.source_id, "ml.txt");
    }

    #[test]
    fn test_retrieve_for_role_filters_after_search() {
        let config = RetrievalConfig {
            access: AccessPolicy::default()
                .with_unrestricted_role("admin")
                .restrict("ml.txt", ["employee"]),
            ..Default::default()
        };
        let retriever = Retriever::new(config).unwrap();
        let store = retriever.build_index(&corpus()).unwrap();

        let public = retriever
            .retrieve_for_role(&store, "machine learning", 1, "public")
            .unwrap();
        assert!(public.is_empty());

        let public = retriever
            .retrieve_for_role(&store, "machine learning", 2, "public")
            .unwrap();
        assert_eq!(public.len(), 1);
        assert_eq!(public[0].chunk.source_id, "cloud.txt");
        assert_eq!(public[0].rank, 1);

        for role in ["employee", "admin"] {
            let results = retriever
                .retrieve_for_role(&store, "machine learning", 1, role)
                .unwrap();
            assert_eq!(results[0].chunk.source_id, "ml.txt");
        }
    }

    #[test]
    fn test_check_compatible() {
        let retriever = Retriever::default();
        let store = retriever.build_index(&corpus()).unwrap();
        assert!(retriever.check_compatible(&store, &corpus()).is_ok());

        let mut grown = corpus();
        grown.push(Document::new("new.txt", "Quantum networks entangle photons."));
        assert!(matches!(
            retriever.check_compatible(&store, &grown),
            Err(RetrievalError::VersionMismatch { .. })
        ));
    }
}
