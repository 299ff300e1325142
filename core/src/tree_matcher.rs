//! `TreeMatcher` — The pluggable lookup behind a `MatchTree`
//!
//! A matcher kind turns an extracted value into an ordered list of
//! [`Candidate`]s. It never resolves outcomes itself: the shared
//! [`resolve_candidates`] loop applies the same rules to every kind.

use crate::{MatchResult, OnMatch};
use std::fmt::Debug;

/// One outcome eligible for the looked-up value, in priority order.
pub struct Candidate<'a, Ctx, A: Clone + Send + Sync + 'static> {
    /// Display form of the key or range that produced this candidate.
    pub key: &'a str,
    /// Outcome to resolve.
    pub on_match: &'a OnMatch<Ctx, A>,
    /// A `NoMatch` from an exclusive candidate ends the lookup.
    pub exclusive: bool,
}

impl<Ctx, A: Clone + Send + Sync + 'static> Clone for Candidate<'_, Ctx, A> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<Ctx, A: Clone + Send + Sync + 'static> Copy for Candidate<'_, Ctx, A> {}

impl<Ctx, A: Clone + Send + Sync + 'static> Debug for Candidate<'_, Ctx, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Candidate")
            .field("key", &self.key)
            .field("exclusive", &self.exclusive)
            .field("tree", &self.on_match.is_tree())
            .finish()
    }
}

/// A matcher kind: exact map, prefix map, IP range trie, or an extension.
///
/// # Contract
///
/// - `candidates` is a pure function of `value`. An empty or unparsable
///   value yields no candidates.
/// - Candidates are returned most specific first. Ties keep configuration order.
///
/// # Example
///
/// ```ignore
/// impl<Ctx, A: Clone + Send + Sync + 'static> TreeMatcher<Ctx, A> for SuffixMapMatcher<Ctx, A> {
///     fn candidates<'a>(&'a self, value: &str) -> Vec<Candidate<'a, Ctx, A>> {
///         self.entries
///             .iter()
///             .filter(|(suffix, _)| value.ends_with(suffix.as_str()))
///             .map(|(suffix, on_match)| Candidate { key: suffix, on_match, exclusive: false })
///             .collect()
///     }
///     fn depth(&self) -> usize { /* max nested depth */ }
///     fn len(&self) -> usize { self.entries.len() }
/// }
/// ```
pub trait TreeMatcher<Ctx, A: Clone + Send + Sync + 'static>: Send + Sync + Debug {
    /// Candidate outcomes for `value`, highest priority first.
    fn candidates<'a>(&'a self, value: &str) -> Vec<Candidate<'a, Ctx, A>>;

    /// Deepest nesting among the configured outcomes (0 if all are actions).
    fn depth(&self) -> usize;

    /// Number of configured keys or ranges.
    fn len(&self) -> usize;

    /// Returns `true` if nothing is configured.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Resolve candidates in order.
///
/// - `Matched` ends the lookup with that action.
/// - `Indeterminate` ends the lookup: an unresolved sub-decision is never skipped.
/// - `NoMatch` ends the lookup for an exclusive candidate, otherwise the next
///   candidate is tried.
///
/// Running out of candidates is `NoMatch`.
pub(crate) fn resolve_candidates<Ctx, A>(
    candidates: Vec<Candidate<'_, Ctx, A>>,
    ctx: &Ctx,
) -> MatchResult<A>
where
    A: Clone + Send + Sync + 'static,
{
    resolve_candidates_with(candidates, |candidate| candidate.on_match.resolve(ctx))
}

/// [`resolve_candidates`] with a caller-supplied resolver, called once per
/// visited candidate. Tracing records each step through it.
pub(crate) fn resolve_candidates_with<'a, Ctx, A, F>(
    candidates: Vec<Candidate<'a, Ctx, A>>,
    mut resolve: F,
) -> MatchResult<A>
where
    A: Clone + Send + Sync + 'static,
    F: FnMut(Candidate<'a, Ctx, A>) -> MatchResult<A>,
{
    for candidate in candidates {
        match resolve(candidate) {
            MatchResult::Matched(action) => return MatchResult::Matched(action),
            MatchResult::Indeterminate => return MatchResult::Indeterminate,
            MatchResult::NoMatch if candidate.exclusive => return MatchResult::NoMatch,
            MatchResult::NoMatch => {}
        }
    }
    MatchResult::NoMatch
}
