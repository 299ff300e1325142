//! Conformance tests that run YAML fixtures against mtree
//!
//! Run with: cargo test -p mtree-test --test conformance

#![cfg(feature = "fixtures")]

use mtree_test::fixture::Fixture;
use std::fs;
use std::path::{Path, PathBuf};

fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures")
}

/// Load and run every fixture in one file
fn run_fixture_file(name: &str) {
    let path = fixtures_dir().join(name);
    let yaml = fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {e}", path.display()));

    // Parse potentially multiple fixtures (separated by ---)
    let fixtures = Fixture::from_yaml_multi(&yaml).unwrap_or_else(|e| {
        panic!("Failed to parse {}: {e}", path.display());
    });
    assert!(!fixtures.is_empty(), "{} holds no fixtures", path.display());

    for fixture in fixtures {
        println!("  Running: {}", fixture.name);
        fixture.run_and_assert();
    }
}

#[test]
fn test_trie() {
    run_fixture_file("01_trie.yaml");
}

#[test]
fn test_ipv6() {
    run_fixture_file("02_ipv6.yaml");
}

#[test]
fn test_nested() {
    run_fixture_file("03_nested.yaml");
}

#[test]
fn test_no_data() {
    run_fixture_file("04_no_data.yaml");
}

#[test]
fn test_maps() {
    run_fixture_file("05_maps.yaml");
}

#[test]
fn test_load_errors() {
    run_fixture_file("06_errors.yaml");
}

#[test]
fn every_fixture_file_is_covered() {
    let mut files: Vec<String> = fs::read_dir(fixtures_dir())
        .expect("read fixtures dir")
        .filter_map(|entry| {
            let path = entry.expect("dir entry").path();
            let is_yaml = path.extension().is_some_and(|e| e == "yaml" || e == "yml");
            is_yaml.then(|| path.file_name().unwrap().to_string_lossy().into_owned())
        })
        .collect();
    files.sort();

    assert_eq!(
        files,
        [
            "01_trie.yaml",
            "02_ipv6.yaml",
            "03_nested.yaml",
            "04_no_data.yaml",
            "05_maps.yaml",
            "06_errors.yaml",
        ]
    );
}
