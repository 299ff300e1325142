//! mtree-test: Test domain for conformance testing
//!
//! Provides a simple context and `DataInput` implementation for testing match
//! trees, including fields that are still pending. This is the reference
//! extension that demonstrates how to build mtree domains.
//!
//! # Example
//!
//! ```
//! use mtree_test::prelude::*;
//!
//! // TestContext is a key-value map; keys can also be marked pending
//! let ctx = TestContext::new()
//!     .with("ip", "10.0.0.1")
//!     .pending("user");
//!
//! assert_eq!(StringInput::new("ip").get(&ctx), FieldValue::from("10.0.0.1"));
//! assert_eq!(StringInput::new("user").get(&ctx), FieldValue::Pending);
//! assert_eq!(StringInput::new("missing").get(&ctx), FieldValue::absent());
//! ```

use mtree::prelude::*;
use std::collections::{HashMap, HashSet};

#[cfg(feature = "fixtures")]
pub mod fixture;

/// Test context: a string-to-string map plus a set of pending keys.
///
/// Used for conformance testing where we need predictable,
/// controllable input data.
#[derive(Debug, Clone, Default)]
pub struct TestContext {
    values: HashMap<String, String>,
    pending: HashSet<String>,
}

impl TestContext {
    /// Create an empty test context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a key-value pair (builder pattern). Clears a pending mark on `key`.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        self.pending.remove(&key);
        self.values.insert(key, value.into());
        self
    }

    /// Mark `key` as not yet available (builder pattern).
    #[must_use]
    pub fn pending(mut self, key: impl Into<String>) -> Self {
        let key = key.into();
        self.values.remove(&key);
        self.pending.insert(key);
        self
    }

    /// Get a value by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Returns `true` if `key` is marked pending.
    #[must_use]
    pub fn is_pending(&self, key: &str) -> bool {
        self.pending.contains(key)
    }
}

/// Extracts a string value from `TestContext` by key.
///
/// Pending keys yield [`FieldValue::Pending`], missing keys an empty value.
#[derive(Debug, Clone)]
pub struct StringInput {
    key: String,
}

impl StringInput {
    /// Create a new string input extractor.
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

impl DataInput<TestContext> for StringInput {
    fn get(&self, ctx: &TestContext) -> FieldValue {
        if ctx.is_pending(&self.key) {
            return FieldValue::Pending;
        }
        ctx.get(&self.key).into()
    }
}

/// Prelude for convenient imports.
pub mod prelude {
    pub use super::{StringInput, TestContext};
    pub use mtree::prelude::*;
}

// ═══════════════════════════════════════════════════════════════════════════════
// Registry support (feature = "registry")
// ═══════════════════════════════════════════════════════════════════════════════

/// Configuration for [`StringInput`].
#[cfg(feature = "registry")]
#[derive(serde::Deserialize)]
pub struct StringInputConfig {
    /// The key to extract from the test context.
    pub key: String,
}

#[cfg(feature = "registry")]
impl mtree::IntoDataInput<TestContext> for StringInput {
    type Config = StringInputConfig;

    fn from_config(
        config: Self::Config,
    ) -> Result<Box<dyn mtree::DataInput<TestContext>>, mtree::MatcherError> {
        Ok(Box::new(StringInput::new(config.key)))
    }
}

/// Register all mtree-test types with the given builder.
///
/// Registers core matcher kinds (`IpMatcher`) and test-domain inputs:
/// - `mtree.test.v1.StringInput` → [`StringInput`]
#[cfg(feature = "registry")]
#[must_use]
pub fn register<A>(
    builder: mtree::RegistryBuilder<TestContext, A>,
) -> mtree::RegistryBuilder<TestContext, A>
where
    A: Clone + Send + Sync + serde::de::DeserializeOwned + 'static,
{
    mtree::register_core_matchers(builder).input::<StringInput>("mtree.test.v1.StringInput")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_builder() {
        let ctx = TestContext::new().with("foo", "bar").with("baz", "qux");

        assert_eq!(ctx.get("foo"), Some("bar"));
        assert_eq!(ctx.get("baz"), Some("qux"));
        assert_eq!(ctx.get("missing"), None);
    }

    #[test]
    fn test_pending_and_with_override_each_other() {
        let ctx = TestContext::new().with("k", "v").pending("k");
        assert!(ctx.is_pending("k"));
        assert_eq!(ctx.get("k"), None);

        let ctx = ctx.with("k", "later");
        assert!(!ctx.is_pending("k"));
        assert_eq!(StringInput::new("k").get(&ctx), FieldValue::from("later"));
    }

    #[test]
    fn test_string_input_missing_key_is_absent() {
        let input = StringInput::new("missing");
        assert_eq!(input.get(&TestContext::new()), FieldValue::absent());
    }

    #[test]
    fn test_full_tree() {
        let tree: MatchTree<TestContext, &str> = MatchTree::ip_ranges(
            Box::new(StringInput::new("ip")),
            vec![RangeGroup::new(
                vec!["10.0.0.0/8".parse().unwrap()],
                OnMatch::Action("internal"),
            )],
            Some(OnMatch::Action("external")),
        );

        let ctx = TestContext::new().with("ip", "10.2.3.4");
        assert_eq!(tree.evaluate(&ctx), MatchResult::Matched("internal"));

        let ctx = TestContext::new().with("ip", "8.8.8.8");
        assert_eq!(tree.evaluate(&ctx), MatchResult::Matched("external"));

        let ctx = TestContext::new().pending("ip");
        assert_eq!(tree.evaluate(&ctx), MatchResult::Indeterminate);
    }

    #[cfg(feature = "registry")]
    #[test]
    fn test_register() {
        let registry = register::<String>(mtree::RegistryBuilder::new()).build();
        assert!(registry.contains_input("mtree.test.v1.StringInput"));
        assert!(registry.contains_matcher("mtree.core.v1.IpMatcher"));
    }
}
