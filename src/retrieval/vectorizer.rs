// SPDX-License-Identifier: MIT OR Apache-2.0

//! Sparse TF-IDF vectors.

use std::collections::BTreeMap;

use crate::retrieval::vocabulary::{IdfTable, TermId, Vocabulary};

/// Sparse vector of `(position, weight)` pairs sorted by ascending position.
///
/// Zero weights are never stored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseVector {
    entries: Vec<(TermId, f64)>,
}

impl SparseVector {
    /// Builds a vector from pairs already sorted by strictly ascending position.
    ///
    /// Returns `None` if positions are unsorted or repeated, or if any weight is
    /// not a finite positive number.
    pub fn from_sorted(entries: Vec<(TermId, f64)>) -> Option<Self> {
        let ordered = entries.windows(2).all(|w| w[0].0 < w[1].0);
        let valid = entries.iter().all(|(_, w)| w.is_finite() && *w > 0.0);
        (ordered && valid).then_some(Self { entries })
    }

    pub fn entries(&self) -> &[(TermId, f64)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Largest position present, if any.
    pub fn max_position(&self) -> Option<TermId> {
        self.entries.last().map(|(id, _)| *id)
    }

    /// L2 norm, summed in position order.
    pub fn norm(&self) -> f64 {
        self.entries.iter().map(|(_, w)| w * w).sum::<f64>().sqrt()
    }

    /// Dot product over the intersection of non-zero positions.
    ///
    /// Merge walk over both sorted entry lists, linear in their combined
    /// length and independent of vocabulary size.
    pub fn dot(&self, other: &SparseVector) -> f64 {
        let (a, b) = (&self.entries, &other.entries);
        let (mut i, mut j) = (0, 0);
        let mut sum = 0.0;
        while i < a.len() && j < b.len() {
            match a[i].0.cmp(&b[j].0) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    sum += a[i].1 * b[j].1;
                    i += 1;
                    j += 1;
                }
            }
        }
        sum
    }
}

/// Turns a token sequence into a TF-IDF vector.
///
/// `weight(t) = count(t) * idf(t)`. Tokens missing from the vocabulary are
/// dropped.
pub fn vectorize<S: AsRef<str>>(
    tokens: &[S],
    vocabulary: &Vocabulary,
    idf: &IdfTable,
) -> SparseVector {
    let mut counts: BTreeMap<TermId, u32> = BTreeMap::new();
    for token in tokens {
        if let Some(id) = vocabulary.get(token.as_ref()) {
            *counts.entry(id).or_insert(0) += 1;
        }
    }

    let entries = counts
        .into_iter()
        .filter_map(|(id, tf)| {
            let weight = f64::from(tf) * idf.get(id)?;
            (weight > 0.0).then_some((id, weight))
        })
        .collect();

    SparseVector { entries }
}

/// Cosine similarity clamped to `[0, 1]`; 0 when either vector has zero norm.
pub fn cosine(a: &SparseVector, a_norm: f64, b: &SparseVector, b_norm: f64) -> f64 {
    if a_norm == 0.0 || b_norm == 0.0 {
        return 0.0;
    }
    (a.dot(b) / (a_norm * b_norm)).clamp(0.0, 1.0)
}
