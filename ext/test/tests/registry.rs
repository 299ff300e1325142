//! Registry loading from JSON, traces of loaded trees and shared evaluation.

#![cfg(feature = "fixtures")]

use mtree::{MatchTreeConfig, MatcherError};
use mtree_test::fixture::registry;
use mtree_test::prelude::*;

const CONFIG: &str = r#"{
    "input": { "type_url": "mtree.test.v1.StringInput", "config": { "key": "ip" } },
    "custom_match": {
        "type_url": "mtree.core.v1.IpMatcher",
        "config": { "range_matchers": [
            {
                "ranges": [{ "address_prefix": "0.0.0.0" }],
                "on_match": { "type": "action", "action": "public" }
            },
            {
                "ranges": [
                    { "address_prefix": "10.0.0.0", "prefix_len": 8 },
                    { "address_prefix": "fd00::", "prefix_len": 8 }
                ],
                "on_match": { "type": "tree", "tree": {
                    "input": { "type_url": "mtree.test.v1.StringInput", "config": { "key": "user" } },
                    "exact_match_map": { "map": {
                        "root": { "type": "action", "action": "admin" }
                    } }
                } }
            }
        ] }
    },
    "on_no_match": { "type": "action", "action": "v6_public" }
}"#;

fn load() -> MatchTree<TestContext, String> {
    let config: MatchTreeConfig<String> = serde_json::from_str(CONFIG).unwrap();
    registry().load(config).unwrap()
}

#[test]
fn json_config_loads_and_evaluates() {
    let tree = load();
    assert_eq!(tree.depth(), 2);

    let ctx = TestContext::new().with("ip", "10.0.0.1").with("user", "root");
    assert_eq!(tree.evaluate(&ctx), MatchResult::Matched("admin".into()));

    let ctx = TestContext::new().with("ip", "fd00::1").with("user", "root");
    assert_eq!(tree.evaluate(&ctx), MatchResult::Matched("admin".into()));

    let ctx = TestContext::new().with("ip", "10.0.0.1").with("user", "bob");
    assert_eq!(tree.evaluate(&ctx), MatchResult::Matched("public".into()));

    let ctx = TestContext::new().with("ip", "2001:db8::1");
    assert_eq!(tree.evaluate(&ctx), MatchResult::Matched("v6_public".into()));
}

#[test]
fn yaml_and_json_load_the_same_tree() {
    let json: MatchTreeConfig<String> = serde_json::from_str(CONFIG).unwrap();
    let yaml: MatchTreeConfig<String> = serde_yaml::from_str(CONFIG).unwrap();
    let (from_json, from_yaml) = (registry().load(json).unwrap(), registry().load(yaml).unwrap());

    for (ip, user) in [("10.1.1.1", "root"), ("10.1.1.1", "x"), ("8.8.8.8", ""), ("::1", "")] {
        let ctx = TestContext::new().with("ip", ip).with("user", user);
        assert_eq!(from_json.evaluate(&ctx), from_yaml.evaluate(&ctx), "{ip} {user}");
    }
}

#[test]
fn trace_records_inclusive_fall_through() {
    let tree = load();
    let ctx = TestContext::new().with("ip", "10.0.0.1").with("user", "bob");
    let trace = tree.evaluate_with_trace(&ctx);

    assert_eq!(trace.result, MatchResult::Matched("public".into()));
    assert_eq!(trace.value, FieldValue::from("10.0.0.1"));
    assert!(!trace.used_fallback());

    let keys: Vec<&str> = trace.steps.iter().map(|s| s.key.as_str()).collect();
    assert_eq!(keys, ["10.0.0.0/8", "0.0.0.0/0"]);

    match &trace.steps[0].on_match {
        OnMatchTrace::Nested(nested) => {
            assert_eq!(nested.result, MatchResult::NoMatch);
            assert_eq!(nested.value, FieldValue::from("bob"));
            assert!(nested.steps.is_empty());
        }
        other => panic!("expected nested trace, got {other:?}"),
    }
}

#[test]
fn trace_records_fallback() {
    let tree = load();
    let trace = tree.evaluate_with_trace(&TestContext::new().with("ip", "2001:db8::1"));

    assert!(trace.steps.is_empty());
    assert!(trace.used_fallback());
    assert_eq!(trace.result, MatchResult::Matched("v6_public".into()));
}

#[test]
fn loaded_tree_is_shareable_across_threads() {
    let tree = load();
    let contexts = [
        (TestContext::new().with("ip", "10.0.0.1").with("user", "root"), "admin"),
        (TestContext::new().with("ip", "192.168.1.1"), "public"),
        (TestContext::new().with("ip", "::1"), "v6_public"),
    ];

    std::thread::scope(|scope| {
        for (ctx, expected) in &contexts {
            let tree = &tree;
            scope.spawn(move || {
                for _ in 0..100 {
                    assert_eq!(tree.evaluate(ctx), MatchResult::Matched((*expected).to_string()));
                }
            });
        }
    });
}

#[test]
fn duplicate_prefix_key_rejected() {
    let json = r#"{
        "input": { "type_url": "mtree.test.v1.StringInput", "config": { "key": "path" } },
        "prefix_match_map": { "map": {
            "/api": { "type": "action", "action": "a" },
            "/api": { "type": "action", "action": "b" }
        } }
    }"#;
    let config: MatchTreeConfig<String> = serde_json::from_str(json).unwrap();
    assert_eq!(
        registry().load(config).unwrap_err(),
        MatcherError::DuplicateKey {
            key: "/api".into(),
            map: "prefix"
        }
    );
}

#[test]
fn duplicate_key_nested_in_range_group_rejected() {
    let json = r#"{
        "input": { "type_url": "mtree.test.v1.StringInput", "config": { "key": "ip" } },
        "custom_match": {
            "type_url": "mtree.core.v1.IpMatcher",
            "config": { "range_matchers": [{
                "ranges": [{ "address_prefix": "10.0.0.0", "prefix_len": 8 }],
                "on_match": { "type": "tree", "tree": {
                    "input": { "type_url": "mtree.test.v1.StringInput", "config": { "key": "user" } },
                    "exact_match_map": { "map": {
                        "root": { "type": "action", "action": "first" },
                        "root": { "type": "action", "action": "second" }
                    } }
                } }
            }] }
        }
    }"#;
    let err = serde_json::from_str::<MatchTreeConfig<String>>(json).unwrap_err();
    assert!(err.to_string().contains("duplicate key `root`"), "{err}");

    let yaml = r#"
input: { type_url: mtree.test.v1.StringInput, config: { key: ip } }
custom_match:
  type_url: mtree.core.v1.IpMatcher
  config:
    range_matchers:
      - ranges: [{ address_prefix: 10.0.0.0, prefix_len: 8 }]
        on_match:
          type: tree
          tree:
            input: { type_url: mtree.test.v1.StringInput, config: { key: user } }
            exact_match_map:
              map:
                root: { type: action, action: first }
                root: { type: action, action: second }
"#;
    let err = serde_yaml::from_str::<MatchTreeConfig<String>>(yaml).unwrap_err();
    assert!(err.to_string().contains("duplicate key `root`"), "{err}");
}
