//! `ExactMapMatcher` — O(1) exact key dispatch.

use crate::{Candidate, MatcherError, OnMatch, TreeMatcher};
use std::collections::HashMap;
use std::fmt::Debug;

/// Maps exact string keys to outcomes.
///
/// An empty value never matches, even if an empty key were configured
/// (an absent field must not select an entry).
pub struct ExactMapMatcher<Ctx, A: Clone + Send + Sync + 'static> {
    map: HashMap<String, OnMatch<Ctx, A>>,
}

impl<Ctx, A: Clone + Send + Sync + 'static> ExactMapMatcher<Ctx, A> {
    /// Build from `(key, outcome)` entries.
    ///
    /// # Errors
    ///
    /// Returns [`MatcherError::DuplicateKey`] if a key repeats.
    pub fn new<K, I>(entries: I) -> Result<Self, MatcherError>
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, OnMatch<Ctx, A>)>,
    {
        let mut map = HashMap::new();
        for (key, on_match) in entries {
            let key = key.into();
            if map.contains_key(&key) {
                return Err(MatcherError::DuplicateKey { key, map: "exact" });
            }
            map.insert(key, on_match);
        }
        tracing::debug!(entries = map.len(), "built exact map matcher");
        Ok(Self { map })
    }
}

impl<Ctx, A: Clone + Send + Sync + 'static> TreeMatcher<Ctx, A> for ExactMapMatcher<Ctx, A> {
    fn candidates<'a>(&'a self, value: &str) -> Vec<Candidate<'a, Ctx, A>> {
        if value.is_empty() {
            return Vec::new();
        }
        self.map
            .get_key_value(value)
            .map(|(key, on_match)| Candidate {
                key,
                on_match,
                exclusive: true,
            })
            .into_iter()
            .collect()
    }

    fn depth(&self) -> usize {
        self.map.values().map(OnMatch::depth).max().unwrap_or(0)
    }

    fn len(&self) -> usize {
        self.map.len()
    }
}

impl<Ctx, A: Clone + Send + Sync + 'static> Debug for ExactMapMatcher<Ctx, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut keys: Vec<&str> = self.map.keys().map(String::as_str).collect();
        keys.sort_unstable();
        f.debug_struct("ExactMapMatcher").field("keys", &keys).finish()
    }
}
