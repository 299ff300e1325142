//! mtree - pluggable match-tree engine for in-flight request classification
//!
//! A match tree answers "which configured action applies to this request?"
//! by extracting one field, looking it up in a matcher, and resolving the
//! configured outcome (an action or a nested tree). Fields may not be
//! available yet, in which case evaluation reports [`MatchResult::Indeterminate`]
//! and can be re-run once more of the request has arrived.
//!
//! # Architecture (Envoy-inspired)
//!
//! - [`FieldValue`] — Tri-state field: available (possibly empty) or pending
//! - [`DataInput<Ctx>`] — Domain-specific field extraction, returns `FieldValue`
//! - [`TreeMatcher<Ctx, A>`] — Pluggable lookup producing prioritized [`Candidate`]s
//! - [`OnMatch<Ctx, A>`] — Action or nested [`MatchTree`]
//! - [`MatchTree<Ctx, A>`] — Input + matcher + optional `on_no_match` fallback
//! - [`MatchResult<A>`] — `Matched`, `NoMatch` or `Indeterminate`
//!
//! # Matcher kinds
//!
//! - [`ExactMapMatcher`] — O(1) exact key dispatch
//! - [`PrefixMapMatcher`] — String prefixes, longest first, inclusive fallback
//! - [`IpRangeMatcher`] — Binary trie over CIDR ranges with exclusive/inclusive groups
//!
//! # Key Design Insights
//!
//! 1. **Candidates, not answers**: matchers only order candidates. The shared
//!    resolution loop decides: first resolved action wins, an `Indeterminate`
//!    candidate stops the lookup, an exclusive miss stops the lookup.
//!
//! 2. **Pending is not a miss**: a `Pending` field never turns into `NoMatch`.
//!    Skipping it could return a complete but wrong answer.
//!
//! 3. **Immutable after construction**: trees are `Send + Sync` and evaluation
//!    is stateless, so one tree serves any number of concurrent requests.
//!
//! # Example
//!
//! ```
//! use mtree::prelude::*;
//!
//! #[derive(Debug)]
//! struct Request { client_ip: String }
//!
//! #[derive(Debug)]
//! struct ClientIpInput;
//!
//! impl DataInput<Request> for ClientIpInput {
//!     fn get(&self, ctx: &Request) -> FieldValue {
//!         FieldValue::Available(ctx.client_ip.clone())
//!     }
//! }
//!
//! let tree: MatchTree<Request, String> = MatchTree::ip_ranges(
//!     Box::new(ClientIpInput),
//!     vec![
//!         RangeGroup::new(vec!["10.0.0.0/8".parse().unwrap()], OnMatch::Action("internal".into())),
//!         RangeGroup::new(vec!["10.1.0.0/16".parse().unwrap()], OnMatch::Action("lab".into())),
//!     ],
//!     Some(OnMatch::Action("external".into())),
//! );
//!
//! let result = tree.evaluate(&Request { client_ip: "10.1.2.3".into() });
//! assert_eq!(result, MatchResult::Matched("lab".to_string()));
//! ```

// ═══════════════════════════════════════════════════════════════════════════════
// Modules
// ═══════════════════════════════════════════════════════════════════════════════

mod data_input;
mod exact_map;
mod field_value;
mod ip_matcher;
mod ip_trie;
mod match_result;
mod match_tree;
mod on_match;
mod prefix_map;
mod radix_tree;
mod trace;
mod tree_matcher;

#[cfg(feature = "registry")]
mod config;
#[cfg(feature = "registry")]
mod registry;

// ═══════════════════════════════════════════════════════════════════════════════
// Public API
// ═══════════════════════════════════════════════════════════════════════════════

// Core types
pub use data_input::DataInput;
pub use field_value::FieldValue;
pub use match_result::MatchResult;
pub use match_tree::MatchTree;
pub use on_match::OnMatch;
pub use radix_tree::RadixTree;
pub use tree_matcher::{Candidate, TreeMatcher};

// Concrete matchers
pub use exact_map::ExactMapMatcher;
pub use ip_matcher::{parse_range, IpRangeMatcher, RangeGroup};
pub use prefix_map::PrefixMapMatcher;

// Registry (feature-gated)
#[cfg(feature = "registry")]
pub use config::{
    CidrRangeConfig, IpMatcherConfig, MapConfig, MatchTreeConfig, MatcherKindConfig,
    OnMatchConfig, RangeMatcherConfig, TypedConfig, UnitConfig,
};
#[cfg(feature = "registry")]
pub use registry::{
    register_core_matchers, IntoDataInput, IntoTreeMatcher, Registry, RegistryBuilder,
};

// Trace types
pub use trace::{EvalStep, EvalTrace, OnMatchTrace};

// ═══════════════════════════════════════════════════════════════════════════════
// Prelude
// ═══════════════════════════════════════════════════════════════════════════════

/// Prelude module for convenient imports.
///
/// ```
/// use mtree::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        // Traits
        DataInput,
        TreeMatcher,
        // Core types
        Candidate,
        FieldValue,
        MatchResult,
        MatchTree,
        OnMatch,
        // Errors
        MatcherError,
        // Concrete matchers
        ExactMapMatcher,
        IpRangeMatcher,
        PrefixMapMatcher,
        RangeGroup,
        // Trace types
        EvalStep,
        EvalTrace,
        OnMatchTrace,
    };
}

// ═══════════════════════════════════════════════════════════════════════════════
// Constants
// ═══════════════════════════════════════════════════════════════════════════════

/// Maximum allowed depth for nested match trees.
///
/// Evaluation recurses once per nesting level. Validate at load time via
/// [`MatchTree::validate`].
pub const MAX_DEPTH: usize = 32;

// ═══════════════════════════════════════════════════════════════════════════════
// Errors
// ═══════════════════════════════════════════════════════════════════════════════

/// Errors from match tree construction and validation.
///
/// These are raised while building a tree, never while evaluating one.
/// Fix the configuration and rebuild.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MatcherError {
    /// Tree nesting exceeds [`MAX_DEPTH`].
    #[error(
        "match tree nesting depth is {depth}, but maximum allowed is {max} \
         — reduce nesting or flatten your match tree"
    )]
    DepthExceeded {
        /// Actual depth of the tree.
        depth: usize,
        /// Maximum allowed depth.
        max: usize,
    },

    /// Configuration deserialization or construction failed.
    #[error("invalid config: {reason}")]
    InvalidConfig {
        /// The underlying error message.
        reason: String,
    },

    /// A type URL was not found in the registry.
    #[error("unknown {registry} type URL \"{type_url}\"{}", available_hint(.available, .registry))]
    UnknownTypeUrl {
        /// The unregistered type URL.
        type_url: String,
        /// Which registry was searched (`"input"` or `"matcher"`).
        registry: &'static str,
        /// Type URLs that ARE registered (for self-correcting error messages).
        available: Vec<String>,
    },

    /// A range prefix length exceeds the address family's bit width.
    #[error("prefix length {prefix_len} is out of range for \"{address_prefix}\" (maximum {max})")]
    InvalidPrefixLength {
        /// The configured address prefix.
        address_prefix: String,
        /// The configured prefix length.
        prefix_len: u32,
        /// Bit width of the address family (32 or 128).
        max: u8,
    },

    /// A range address prefix is not an IPv4 or IPv6 address.
    #[error("invalid address prefix \"{address_prefix}\": {reason}")]
    InvalidAddress {
        /// The configured address prefix.
        address_prefix: String,
        /// The underlying parse error.
        reason: String,
    },

    /// A key appears twice in an exact or prefix map.
    #[error("duplicate key \"{key}\" in {map} map")]
    DuplicateKey {
        /// The repeated key.
        key: String,
        /// Which map kind (`"exact"` or `"prefix"`).
        map: &'static str,
    },
}

fn available_hint(available: &[String], registry: &str) -> String {
    if available.is_empty() {
        format!(" — no {registry} types are registered")
    } else {
        let mut sorted: Vec<&str> = available.iter().map(String::as_str).collect();
        sorted.sort_unstable();
        format!(" — registered: {}", sorted.join(", "))
    }
}
