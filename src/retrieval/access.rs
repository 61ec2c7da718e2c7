// SPDX-License-Identifier: MIT OR Apache-2.0

//! Role-based restrictions on which sources a caller may see.
//!
//! Filtering runs after search, so a restricted caller can receive fewer
//! than `k` passages. Ranks are renumbered over the surviving results.

use std::collections::{HashMap, HashSet};
use tracing::warn;

use crate::retrieval::store::SearchResult;

/// Role assumed when none is given or the given one is unknown.
pub const DEFAULT_ROLE: &str = "public";

/// Per-source allow lists plus roles that bypass them.
///
/// Sources without an entry are visible to every role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessPolicy {
    default_role: String,
    unrestricted: HashSet<String>,
    restrictions: HashMap<String, HashSet<String>>,
}

impl Default for AccessPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_ROLE)
    }
}

impl AccessPolicy {
    /// Creates a policy with no restrictions.
    pub fn new(default_role: impl Into<String>) -> Self {
        Self {
            default_role: default_role.into(),
            unrestricted: HashSet::new(),
            restrictions: HashMap::new(),
        }
    }

    /// Lets `role` see every source.
    pub fn with_unrestricted_role(mut self, role: impl Into<String>) -> Self {
        self.unrestricted.insert(role.into());
        self
    }

    /// Limits `source_id` to the listed roles (and unrestricted ones).
    pub fn restrict<I, S>(mut self, source_id: impl Into<String>, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.restrictions
            .entry(source_id.into())
            .or_default()
            .extend(roles.into_iter().map(Into::into));
        self
    }

    pub fn default_role(&self) -> &str {
        &self.default_role
    }

    /// True when at least one source carries an allow list.
    pub fn is_restricted(&self) -> bool {
        !self.restrictions.is_empty()
    }

    fn is_known(&self, role: &str) -> bool {
        role == self.default_role
            || self.unrestricted.contains(role)
            || self.restrictions.values().any(|roles| roles.contains(role))
    }

    /// Maps unknown roles to the default role.
    pub fn resolve_role<'a>(&'a self, role: &'a str) -> &'a str {
        if self.is_known(role) {
            role
        } else {
            &self.default_role
        }
    }

    /// Whether `role` may see passages from `source_id`.
    pub fn allows(&self, role: &str, source_id: &str) -> bool {
        self.allows_resolved(self.resolve_role(role), source_id)
    }

    fn allows_resolved(&self, role: &str, source_id: &str) -> bool {
        if self.unrestricted.contains(role) {
            return true;
        }
        self.restrictions
            .get(source_id)
            .map_or(true, |allowed| allowed.contains(role))
    }

    /// Drops results `role` may not see and renumbers ranks from 1.
    pub fn filter<'a>(&self, role: &str, results: Vec<SearchResult<'a>>) -> Vec<SearchResult<'a>> {
        let resolved = self.resolve_role(role);
        if resolved != role {
            warn!(role, fallback = resolved, "unknown role");
        }

        results
            .into_iter()
            .filter(|r| self.allows_resolved(resolved, &r.chunk.source_id))
            .enumerate()
            .map(|(i, r)| SearchResult { rank: i + 1, ..r })
            .collect()
    }
}
