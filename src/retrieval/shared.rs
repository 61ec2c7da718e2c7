// SPDX-License-Identifier: MIT OR Apache-2.0

//! Process-wide handle to the current index.
//!
//! Readers take an `Arc` snapshot and keep using it for the whole query, so a
//! rebuild that swaps in a new store is never observed half-way.

use std::sync::{Arc, RwLock};
use tracing::info;

use crate::errors::Result;
use crate::retrieval::chunker::Document;
use crate::retrieval::retriever::Retriever;
use crate::retrieval::store::{IndexStore, Passage};

/// Shared, atomically replaceable [`IndexStore`].
#[derive(Debug)]
pub struct SharedIndex {
    current: RwLock<Arc<IndexStore>>,
}

impl SharedIndex {
    pub fn new(store: IndexStore) -> Self {
        Self {
            current: RwLock::new(Arc::new(store)),
        }
    }

    /// Returns the index as of now. Later swaps do not affect the snapshot.
    pub fn snapshot(&self) -> Arc<IndexStore> {
        // The lock only guards an Arc clone, so a poisoned lock still holds a
        // complete store.
        match self.current.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    /// Installs `store` and returns the previous index.
    pub fn replace(&self, store: IndexStore) -> Arc<IndexStore> {
        let next = Arc::new(store);
        let mut guard = match self.current.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        std::mem::replace(&mut *guard, next)
    }

    /// Builds a new index from `documents` and swaps it in once complete.
    ///
    /// On failure the current index stays in place.
    pub fn rebuild(&self, retriever: &Retriever, documents: &[Document]) -> Result<Arc<IndexStore>> {
        let store = retriever.build_index(documents)?;
        let entries = store.len();
        let previous = self.replace(store);
        info!(entries, previous_entries = previous.len(), "swapped index");
        Ok(previous)
    }

    /// Runs one query against a single snapshot.
    pub fn retrieve(&self, retriever: &Retriever, question: &str, k: usize) -> Result<Vec<Passage>> {
        let store = self.snapshot();
        let results = retriever.retrieve(&store, question, k)?;
        Ok(results.iter().map(|r| r.to_passage()).collect())
    }

    /// Runs one role-filtered query against a single snapshot.
    pub fn retrieve_for_role(
        &self,
        retriever: &Retriever,
        question: &str,
        k: usize,
        role: &str,
    ) -> Result<Vec<Passage>> {
        let store = self.snapshot();
        let results = retriever.retrieve_for_role(&store, question, k, role)?;
        Ok(results.iter().map(|r| r.to_passage()).collect())
    }
}
