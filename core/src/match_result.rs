//! `MatchResult` — Tri-state outcome of evaluating a match tree.

/// Outcome of [`MatchTree::evaluate`](crate::MatchTree::evaluate).
///
/// | Variant | Caller interpretation |
/// |---------|-----------------------|
/// | `Matched(a)` | invoke action `a` |
/// | `NoMatch` | no policy applies |
/// | `Indeterminate` | retry once more of the request is available |
///
/// `Matched` and `NoMatch` are *complete* results. `Indeterminate` is not a
/// failure: some field the decision depends on was still pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[must_use]
pub enum MatchResult<A> {
    /// An action was resolved.
    Matched(A),
    /// Evaluation completed and nothing matched.
    NoMatch,
    /// A required field was pending.
    Indeterminate,
}

impl<A> MatchResult<A> {
    /// Returns `true` for `Matched`.
    #[inline]
    #[must_use]
    pub fn is_matched(&self) -> bool {
        matches!(self, Self::Matched(_))
    }

    /// Returns `true` for `NoMatch`.
    #[inline]
    #[must_use]
    pub fn is_no_match(&self) -> bool {
        matches!(self, Self::NoMatch)
    }

    /// Returns `true` for `Indeterminate`.
    #[inline]
    #[must_use]
    pub fn is_indeterminate(&self) -> bool {
        matches!(self, Self::Indeterminate)
    }

    /// Returns `true` for `Matched` or `NoMatch`.
    #[inline]
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.is_indeterminate()
    }

    /// The matched action, if any.
    #[inline]
    #[must_use]
    pub fn action(&self) -> Option<&A> {
        match self {
            Self::Matched(a) => Some(a),
            Self::NoMatch | Self::Indeterminate => None,
        }
    }

    /// Consume the result, keeping only a matched action.
    ///
    /// Loses the distinction between `NoMatch` and `Indeterminate`.
    #[inline]
    #[must_use]
    pub fn into_action(self) -> Option<A> {
        match self {
            Self::Matched(a) => Some(a),
            Self::NoMatch | Self::Indeterminate => None,
        }
    }

    /// Map the matched action, preserving `NoMatch` and `Indeterminate`.
    #[inline]
    pub fn map<B, F: FnOnce(A) -> B>(self, f: F) -> MatchResult<B> {
        match self {
            Self::Matched(a) => MatchResult::Matched(f(a)),
            Self::NoMatch => MatchResult::NoMatch,
            Self::Indeterminate => MatchResult::Indeterminate,
        }
    }
}

/// A complete result: `Some` is a match, `None` a definite non-match.
impl<A> From<Option<A>> for MatchResult<A> {
    fn from(value: Option<A>) -> Self {
        value.map_or(Self::NoMatch, Self::Matched)
    }
}
