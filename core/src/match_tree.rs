//! `MatchTree` — One decision node: input, matcher kind, fallback.
//!
//! Implements the xDS `Matcher` evaluation: extract a value via `DataInput`,
//! hand it to the configured [`TreeMatcher`], resolve the prioritized
//! candidates, and fall back to `on_no_match` when nothing resolved.

use crate::trace::{EvalStep, EvalTrace};
use crate::tree_matcher::{resolve_candidates, resolve_candidates_with};
use crate::{
    DataInput, ExactMapMatcher, IpRangeMatcher, MatchResult, MatcherError, OnMatch,
    PrefixMapMatcher, RangeGroup, TreeMatcher, MAX_DEPTH,
};
use std::fmt::Debug;

/// A decision tree node.
///
/// Trees are immutable after construction and `Send + Sync`, so a single
/// tree can be shared by any number of concurrent evaluations.
///
/// # Example
///
/// ```ignore
/// let tree = MatchTree::exact(
///     Box::new(ServerNameInput),
///     [
///         ("api.example.com", OnMatch::Action("api")),
///         ("www.example.com", OnMatch::Action("web")),
///     ],
///     Some(OnMatch::Action("default")),
/// )?;
/// ```
pub struct MatchTree<Ctx, A: Clone + Send + Sync + 'static> {
    input: Box<dyn DataInput<Ctx>>,
    matcher: Box<dyn TreeMatcher<Ctx, A>>,
    on_no_match: Option<OnMatch<Ctx, A>>,
}

impl<Ctx, A: Clone + Send + Sync + 'static> MatchTree<Ctx, A> {
    /// Create a tree from an input, any matcher kind, and an optional fallback.
    pub fn new(
        input: Box<dyn DataInput<Ctx>>,
        matcher: Box<dyn TreeMatcher<Ctx, A>>,
        on_no_match: Option<OnMatch<Ctx, A>>,
    ) -> Self {
        Self {
            input,
            matcher,
            on_no_match,
        }
    }

    /// Evaluate the tree against a context.
    ///
    /// 1. Pull the field. `Pending` ⇒ `Indeterminate` (the fallback is not consulted).
    /// 2. Resolve the matcher's candidates in priority order.
    /// 3. `Matched` and `Indeterminate` are returned as-is.
    /// 4. `NoMatch` resolves `on_no_match` when configured, else `NoMatch`.
    pub fn evaluate(&self, ctx: &Ctx) -> MatchResult<A> {
        let value = self.input.get(ctx);
        let Some(value) = value.as_str() else {
            tracing::trace!(input = ?self.input, "field pending, result indeterminate");
            return MatchResult::Indeterminate;
        };

        match resolve_candidates(self.matcher.candidates(value), ctx) {
            MatchResult::NoMatch => self
                .on_no_match
                .as_ref()
                .map_or(MatchResult::NoMatch, |fallback| fallback.resolve(ctx)),
            resolved => resolved,
        }
    }

    /// Evaluate and record every decision along the way.
    ///
    /// The returned trace's `result` is always equal to [`evaluate`](Self::evaluate).
    pub fn evaluate_with_trace(&self, ctx: &Ctx) -> EvalTrace<A> {
        let value = self.input.get(ctx);
        let mut trace = EvalTrace {
            result: MatchResult::NoMatch,
            input: format!("{:?}", self.input),
            value: value.clone(),
            steps: Vec::new(),
            fallback: None,
        };

        let Some(value) = value.as_str() else {
            trace.result = MatchResult::Indeterminate;
            return trace;
        };

        let steps = &mut trace.steps;
        let resolved = resolve_candidates_with(self.matcher.candidates(value), |candidate| {
            let on_match = candidate.on_match.resolve_with_trace(ctx);
            let result = on_match.result();
            steps.push(EvalStep {
                key: candidate.key.to_owned(),
                exclusive: candidate.exclusive,
                on_match,
            });
            result
        });
        if !resolved.is_no_match() {
            trace.result = resolved;
            return trace;
        }

        if let Some(fallback) = &self.on_no_match {
            let fallback = fallback.resolve_with_trace(ctx);
            trace.result = fallback.result();
            trace.fallback = Some(fallback);
        }
        trace
    }

    /// Depth of this tree: 1 plus the deepest nested tree.
    pub fn depth(&self) -> usize {
        let fallback = self.on_no_match.as_ref().map_or(0, OnMatch::depth);
        1 + self.matcher.depth().max(fallback)
    }

    /// Check structural limits.
    ///
    /// # Errors
    ///
    /// Returns [`MatcherError::DepthExceeded`] if nesting exceeds [`MAX_DEPTH`].
    pub fn validate(&self) -> Result<(), MatcherError> {
        let depth = self.depth();
        if depth > MAX_DEPTH {
            return Err(MatcherError::DepthExceeded {
                depth,
                max: MAX_DEPTH,
            });
        }
        Ok(())
    }

    /// The field extractor of this tree.
    #[must_use]
    pub fn input(&self) -> &dyn DataInput<Ctx> {
        self.input.as_ref()
    }

    /// The matcher kind of this tree.
    #[must_use]
    pub fn matcher(&self) -> &dyn TreeMatcher<Ctx, A> {
        self.matcher.as_ref()
    }

    /// The fallback outcome, if configured.
    #[must_use]
    pub fn on_no_match(&self) -> Option<&OnMatch<Ctx, A>> {
        self.on_no_match.as_ref()
    }

    /// Returns `true` if an `on_no_match` fallback is configured.
    #[must_use]
    pub fn has_fallback(&self) -> bool {
        self.on_no_match.is_some()
    }
}

impl<Ctx: 'static, A: Clone + Send + Sync + 'static> MatchTree<Ctx, A> {
    /// Create an exact-match tree.
    ///
    /// # Errors
    ///
    /// Returns [`MatcherError::DuplicateKey`] if a key repeats.
    pub fn exact<K, I>(
        input: Box<dyn DataInput<Ctx>>,
        entries: I,
        on_no_match: Option<OnMatch<Ctx, A>>,
    ) -> Result<Self, MatcherError>
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, OnMatch<Ctx, A>)>,
    {
        let matcher = ExactMapMatcher::new(entries)?;
        Ok(Self::new(input, Box::new(matcher), on_no_match))
    }

    /// Create a prefix-match tree. Longer prefixes are tried first.
    ///
    /// # Errors
    ///
    /// Returns [`MatcherError::DuplicateKey`] if a prefix repeats.
    pub fn prefix<K, I>(
        input: Box<dyn DataInput<Ctx>>,
        entries: I,
        on_no_match: Option<OnMatch<Ctx, A>>,
    ) -> Result<Self, MatcherError>
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, OnMatch<Ctx, A>)>,
    {
        let matcher = PrefixMapMatcher::new(entries)?;
        Ok(Self::new(input, Box::new(matcher), on_no_match))
    }

    /// Create an IP range tree from range groups in configuration order.
    pub fn ip_ranges(
        input: Box<dyn DataInput<Ctx>>,
        groups: Vec<RangeGroup<Ctx, A>>,
        on_no_match: Option<OnMatch<Ctx, A>>,
    ) -> Self {
        Self::new(input, Box::new(IpRangeMatcher::new(groups)), on_no_match)
    }
}

impl<Ctx, A: Clone + Send + Sync + 'static> Debug for MatchTree<Ctx, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatchTree")
            .field("input", &self.input)
            .field("matcher", &self.matcher)
            .field("has_fallback", &self.has_fallback())
            .finish()
    }
}
