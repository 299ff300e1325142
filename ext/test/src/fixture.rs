//! Conformance test fixture runner
//!
//! Loads YAML fixtures, builds their trees through the registry and runs the
//! cases against them. A fixture either carries `cases` or an `expect_error`
//! substring that loading must fail with.
//!
//! ```yaml
//! name: longest_prefix_wins
//! tree:
//!   input: { type_url: mtree.test.v1.StringInput, config: { key: ip } }
//!   custom_match:
//!     type_url: mtree.core.v1.IpMatcher
//!     config:
//!       range_matchers:
//!         - ranges: [{ address_prefix: 192.0.0.0, prefix_len: 2 }]
//!           on_match: { type: action, action: foo }
//! cases:
//!   - name: hit
//!     context: { ip: 192.0.0.1 }
//!     expect: { action: foo }
//!   - name: still_resolving
//!     pending: [ip]
//!     expect: indeterminate
//! ```

use mtree::prelude::*;
use mtree::{MatchTreeConfig, Registry, RegistryBuilder};
use serde::Deserialize;
use std::collections::HashMap;

use crate::TestContext;

/// A complete test fixture
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Fixture {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Raw tree config; parsed at load time so parse failures can be expected.
    pub tree: serde_yaml::Value,
    #[serde(default)]
    pub cases: Vec<TestCase>,
    /// Substring of the error loading `tree` must fail with.
    #[serde(default)]
    pub expect_error: Option<String>,
}

/// Test case
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TestCase {
    pub name: String,
    #[serde(default)]
    pub context: HashMap<String, String>,
    /// Keys whose values have not arrived yet.
    #[serde(default)]
    pub pending: Vec<String>,
    #[serde(with = "serde_yaml::with::singleton_map")]
    pub expect: Expect,
}

/// Expected outcome of a case.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expect {
    Action(String),
    NoMatch,
    Indeterminate,
}

impl From<MatchResult<String>> for Expect {
    fn from(result: MatchResult<String>) -> Self {
        match result {
            MatchResult::Matched(action) => Expect::Action(action),
            MatchResult::NoMatch => Expect::NoMatch,
            MatchResult::Indeterminate => Expect::Indeterminate,
        }
    }
}

/// Why a fixture's tree failed to load.
#[derive(Debug, thiserror::Error)]
pub enum FixtureError {
    #[error("invalid tree config: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error(transparent)]
    Load(#[from] MatcherError),
}

impl TestCase {
    /// Build a TestContext from this case's context map and pending keys
    pub fn build_context(&self) -> TestContext {
        let ctx = self
            .context
            .iter()
            .fold(TestContext::new(), |ctx, (k, v)| ctx.with(k.clone(), v.clone()));
        self.pending
            .iter()
            .fold(ctx, |ctx, key| ctx.pending(key.clone()))
    }
}

/// Registry with core matchers and the test-domain inputs.
#[must_use]
pub fn registry() -> Registry<TestContext, String> {
    crate::register(RegistryBuilder::new()).build()
}

// ═══════════════════════════════════════════════════════════════════════════════
// Runner
// ═══════════════════════════════════════════════════════════════════════════════

/// Result of running a single test case
#[derive(Debug)]
pub struct CaseResult {
    pub case_name: String,
    pub passed: bool,
    pub expected: Expect,
    pub actual: Expect,
    /// Repeated evaluation or the trace disagreed with the first result.
    pub inconsistent: bool,
}

impl Fixture {
    /// Parse a fixture from YAML
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Parse multiple fixtures from a YAML file with `---` separators
    pub fn from_yaml_multi(yaml: &str) -> Result<Vec<Self>, serde_yaml::Error> {
        serde_yaml::Deserializer::from_str(yaml)
            .map(Self::deserialize)
            .collect()
    }

    /// Parse and load this fixture's tree.
    ///
    /// # Errors
    ///
    /// [`FixtureError::Parse`] if the tree config is malformed,
    /// [`FixtureError::Load`] if the registry rejects it.
    pub fn load(&self) -> Result<MatchTree<TestContext, String>, FixtureError> {
        let config: MatchTreeConfig<String> = serde_yaml::from_value(self.tree.clone())?;
        Ok(registry().load(config)?)
    }

    /// Run all test cases and return results
    ///
    /// # Errors
    ///
    /// Any [`FixtureError`] from [`load()`](Self::load).
    pub fn run(&self) -> Result<Vec<CaseResult>, FixtureError> {
        let tree = self.load()?;
        Ok(self
            .cases
            .iter()
            .map(|case| {
                let ctx = case.build_context();
                let first = tree.evaluate(&ctx);
                let inconsistent =
                    tree.evaluate(&ctx) != first || tree.evaluate_with_trace(&ctx).result != first;
                let actual = Expect::from(first);
                CaseResult {
                    case_name: case.name.clone(),
                    passed: actual == case.expect && !inconsistent,
                    expected: case.expect.clone(),
                    actual,
                    inconsistent,
                }
            })
            .collect())
    }

    /// Run the fixture and panic on first failure
    pub fn run_and_assert(&self) {
        if let Some(expected) = &self.expect_error {
            match self.load() {
                Ok(_) => panic!(
                    "Fixture '{}' loaded, expected error containing {expected:?}",
                    self.name
                ),
                Err(err) => assert!(
                    err.to_string().contains(expected.as_str()),
                    "Fixture '{}' failed with {err}, expected error containing {expected:?}",
                    self.name
                ),
            }
            return;
        }

        let results = self
            .run()
            .unwrap_or_else(|e| panic!("Fixture '{}' failed to load: {e}", self.name));
        for result in results {
            assert!(
                result.passed,
                "Fixture '{}' case '{}' failed: expected {:?}, got {:?}{}",
                self.name,
                result.case_name,
                result.expected,
                result.actual,
                if result.inconsistent { " (inconsistent across evaluations)" } else { "" }
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"
name: exact_users
tree:
  input: { type_url: mtree.test.v1.StringInput, config: { key: user } }
  exact_match_map:
    map:
      root: { type: action, action: admin }
  on_no_match: { type: action, action: guest }
cases:
  - name: hit
    context: { user: root }
    expect: { action: admin }
  - name: fallback
    context: { user: bob }
    expect: { action: guest }
  - name: pending
    pending: [user]
    expect: indeterminate
"#;

    #[test]
    fn parse_and_run() {
        let fixture = Fixture::from_yaml(FIXTURE).unwrap();
        assert_eq!(fixture.name, "exact_users");
        assert_eq!(fixture.cases.len(), 3);
        assert_eq!(fixture.cases[2].expect, Expect::Indeterminate);

        let results = fixture.run().unwrap();
        assert!(results.iter().all(|r| r.passed), "{results:?}");
    }

    #[test]
    fn failing_case_reported() {
        let yaml = FIXTURE.replace("expect: { action: admin }", "expect: no_match");
        let fixture = Fixture::from_yaml(&yaml).unwrap();

        let results = fixture.run().unwrap();
        assert!(!results[0].passed);
        assert_eq!(results[0].actual, Expect::Action("admin".into()));
        assert!(!results[0].inconsistent);
    }

    #[test]
    fn multi_document() {
        let yaml = format!("{FIXTURE}\n---\n{FIXTURE}");
        assert_eq!(Fixture::from_yaml_multi(&yaml).unwrap().len(), 2);
    }

    #[test]
    fn load_error_surfaces() {
        let fixture = Fixture::from_yaml(
            r#"
name: unknown_input
tree:
  input: { type_url: mtree.test.v1.Nope }
  exact_match_map: { map: {} }
expect_error: "unknown input type URL"
"#,
        )
        .unwrap();

        assert!(matches!(fixture.load(), Err(FixtureError::Load(_))));
        fixture.run_and_assert();
    }

    #[test]
    fn build_context_marks_pending() {
        let case = TestCase {
            name: "c".into(),
            context: HashMap::from([("a".to_string(), "1".to_string())]),
            pending: vec!["b".into()],
            expect: Expect::NoMatch,
        };
        let ctx = case.build_context();
        assert_eq!(ctx.get("a"), Some("1"));
        assert!(ctx.is_pending("b"));
    }
}
