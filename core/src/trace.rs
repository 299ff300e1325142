//! Evaluation trace types for debugging match tree decisions.
//!
//! Use [`MatchTree::evaluate_with_trace`](crate::MatchTree::evaluate_with_trace)
//! to see which field value was extracted, which candidates were tried in
//! which order, and whether the fallback decided the result.
//!
//! # Example
//!
//! ```ignore
//! let trace = tree.evaluate_with_trace(&ctx);
//! println!("{} = {:?} -> {:?}", trace.input, trace.value, trace.result);
//! for step in &trace.steps {
//!     println!("  {} (exclusive={}): {:?}", step.key, step.exclusive, step.on_match.result());
//! }
//! ```

use crate::{FieldValue, MatchResult};
use std::fmt;

/// Trace of one [`MatchTree`](crate::MatchTree) evaluation.
///
/// # INV: `result` == `evaluate()` result
///
/// The `result` field always equals what
/// [`MatchTree::evaluate()`](crate::MatchTree::evaluate) returns for the same context.
pub struct EvalTrace<A> {
    /// The final result (identical to what `evaluate()` returns).
    pub result: MatchResult<A>,
    /// Debug description of the tree's `DataInput`.
    pub input: String,
    /// The extracted field value.
    pub value: FieldValue,
    /// Candidates tried, in priority order. Stops at the first deciding candidate.
    pub steps: Vec<EvalStep<A>>,
    /// The `on_no_match` resolution, if the fallback was consulted.
    pub fallback: Option<OnMatchTrace<A>>,
}

impl<A> EvalTrace<A> {
    /// Returns `true` if the `on_no_match` fallback produced the result.
    #[must_use]
    pub fn used_fallback(&self) -> bool {
        self.fallback.is_some()
    }
}

impl<A: fmt::Debug> fmt::Debug for EvalTrace<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EvalTrace")
            .field("result", &self.result)
            .field("input", &self.input)
            .field("value", &self.value)
            .field("steps", &self.steps)
            .field("fallback", &self.fallback)
            .finish()
    }
}

/// One candidate tried during evaluation.
pub struct EvalStep<A> {
    /// Key or range that produced the candidate (e.g. `"10.0.0.0/8"`).
    pub key: String,
    /// Whether a miss on this candidate ends the lookup.
    pub exclusive: bool,
    /// How the candidate's outcome resolved.
    pub on_match: OnMatchTrace<A>,
}

impl<A: fmt::Debug> fmt::Debug for EvalStep<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EvalStep")
            .field("key", &self.key)
            .field("exclusive", &self.exclusive)
            .field("on_match", &self.on_match)
            .finish()
    }
}

/// Resolution of an [`OnMatch`](crate::OnMatch) in a trace.
pub enum OnMatchTrace<A> {
    /// A terminal action.
    Action(A),
    /// A nested tree and its full trace.
    Nested(Box<EvalTrace<A>>),
}

impl<A: Clone> OnMatchTrace<A> {
    /// The result this outcome resolved to.
    #[must_use]
    pub fn result(&self) -> MatchResult<A> {
        match self {
            Self::Action(a) => MatchResult::Matched(a.clone()),
            Self::Nested(trace) => trace.result.clone(),
        }
    }
}

impl<A: fmt::Debug> fmt::Debug for OnMatchTrace<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Action(a) => f.debug_tuple("Action").field(a).finish(),
            Self::Nested(trace) => f.debug_tuple("Nested").field(trace).finish(),
        }
    }
}
