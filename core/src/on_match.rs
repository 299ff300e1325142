//! `OnMatch` — What a matched key or range resolves to
//!
//! Per xDS proto semantics, `OnMatch` is **exclusive**: either an action OR
//! a nested tree, never both. This is enforced at the type level with an enum.

use crate::trace::OnMatchTrace;
use crate::{MatchResult, MatchTree};
use std::fmt::Debug;

/// Configured outcome of a match: an opaque action or a nested tree.
///
/// A tree strictly owns its nested trees, so the structure is acyclic by
/// construction and resolution is plain recursive descent.
///
/// # Type Parameters
///
/// - `Ctx`: The context type for nested trees
/// - `A`: The action type (must be `Clone + Send + Sync + 'static`)
pub enum OnMatch<Ctx, A: Clone + Send + Sync + 'static> {
    /// Terminal action, handed back to the caller.
    Action(A),

    /// Continue evaluation into a nested tree.
    /// Its `NoMatch` is a real miss and its `Indeterminate` propagates.
    Tree(Box<MatchTree<Ctx, A>>),
}

impl<Ctx, A: Clone + Send + Sync + 'static> OnMatch<Ctx, A> {
    /// Create an `OnMatch` with an action.
    pub fn action(action: A) -> Self {
        Self::Action(action)
    }

    /// Create an `OnMatch` with a nested tree.
    pub fn tree(nested: MatchTree<Ctx, A>) -> Self {
        Self::Tree(Box::new(nested))
    }

    /// Returns `true` if this is an action.
    pub fn is_action(&self) -> bool {
        matches!(self, Self::Action(_))
    }

    /// Returns `true` if this is a nested tree.
    pub fn is_tree(&self) -> bool {
        matches!(self, Self::Tree(_))
    }

    /// Get the action if this is an `Action` variant.
    pub fn as_action(&self) -> Option<&A> {
        match self {
            Self::Action(a) => Some(a),
            Self::Tree(_) => None,
        }
    }

    /// Get the nested tree if this is a `Tree` variant.
    pub fn as_tree(&self) -> Option<&MatchTree<Ctx, A>> {
        match self {
            Self::Action(_) => None,
            Self::Tree(t) => Some(t),
        }
    }

    /// Resolve this outcome against the context.
    ///
    /// An action is terminal. A nested tree is evaluated and its result is
    /// returned unchanged.
    pub fn resolve(&self, ctx: &Ctx) -> MatchResult<A> {
        match self {
            Self::Action(a) => MatchResult::Matched(a.clone()),
            Self::Tree(tree) => tree.evaluate(ctx),
        }
    }

    /// Like [`resolve`](Self::resolve), recording the nested evaluation path.
    pub fn resolve_with_trace(&self, ctx: &Ctx) -> OnMatchTrace<A> {
        match self {
            Self::Action(a) => OnMatchTrace::Action(a.clone()),
            Self::Tree(tree) => OnMatchTrace::Nested(Box::new(tree.evaluate_with_trace(ctx))),
        }
    }

    /// Nesting depth below this outcome (0 for an action).
    pub fn depth(&self) -> usize {
        match self {
            Self::Action(_) => 0,
            Self::Tree(t) => t.depth(),
        }
    }
}

impl<Ctx, A: Clone + Send + Sync + Debug + 'static> Debug for OnMatch<Ctx, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Action(a) => f.debug_tuple("Action").field(a).finish(),
            Self::Tree(t) => f.debug_tuple("Tree").field(t).finish(),
        }
    }
}
