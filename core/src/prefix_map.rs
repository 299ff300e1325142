//! `PrefixMapMatcher` — String prefix dispatch, longest prefix first.

use crate::{Candidate, MatcherError, OnMatch, RadixTree, TreeMatcher};
use std::fmt::Debug;

/// Maps string prefixes to outcomes.
///
/// Every configured prefix of the value is a candidate, longest first. All
/// candidates are inclusive: when a nested tree under the longest prefix does
/// not match, the next shorter prefix is tried. The empty prefix matches
/// every non-empty value.
pub struct PrefixMapMatcher<Ctx, A: Clone + Send + Sync + 'static> {
    tree: RadixTree<(String, OnMatch<Ctx, A>)>,
}

impl<Ctx, A: Clone + Send + Sync + 'static> PrefixMapMatcher<Ctx, A> {
    /// Build from `(prefix, outcome)` entries.
    ///
    /// # Errors
    ///
    /// Returns [`MatcherError::DuplicateKey`] if a prefix repeats.
    pub fn new<K, I>(entries: I) -> Result<Self, MatcherError>
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, OnMatch<Ctx, A>)>,
    {
        let mut tree = RadixTree::new();
        for (key, on_match) in entries {
            let key = key.into();
            if tree.contains_key(&key) {
                return Err(MatcherError::DuplicateKey { key, map: "prefix" });
            }
            tree.insert(&key.clone(), (key, on_match));
        }
        tracing::debug!(entries = tree.len(), "built prefix map matcher");
        Ok(Self { tree })
    }
}

impl<Ctx, A: Clone + Send + Sync + 'static> TreeMatcher<Ctx, A> for PrefixMapMatcher<Ctx, A> {
    fn candidates<'a>(&'a self, value: &str) -> Vec<Candidate<'a, Ctx, A>> {
        if value.is_empty() {
            return Vec::new();
        }
        self.tree
            .prefixes_of(value)
            .into_iter()
            .rev()
            .map(|(key, on_match)| Candidate {
                key,
                on_match,
                exclusive: false,
            })
            .collect()
    }

    fn depth(&self) -> usize {
        self.tree
            .values()
            .map(|(_, on_match)| on_match.depth())
            .max()
            .unwrap_or(0)
    }

    fn len(&self) -> usize {
        self.tree.len()
    }
}

impl<Ctx, A: Clone + Send + Sync + 'static> Debug for PrefixMapMatcher<Ctx, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrefixMapMatcher")
            .field("entries", &self.tree.len())
            .finish()
    }
}
