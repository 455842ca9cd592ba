//! Integration tests for snipcheck
//!
//! Tests that run submissions require `python3` on PATH.
//! Run with: cargo test -p snipcheck --features integration-tests

use std::fs;

use snipcheck::config::Config;

#[cfg(feature = "integration-tests")]
mod pipeline;

const FIXTURES_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures");

/// Helper to get fixture file content
#[allow(dead_code)]
pub(crate) fn fixture_source(name: &str) -> String {
    let path = format!("{FIXTURES_PATH}/sources/{name}");
    fs::read_to_string(&path).unwrap_or_else(|e| panic!("Failed to read fixture {path}: {e}"))
}

/// Default config with the remote resolver switched off
#[allow(dead_code)]
pub(crate) fn test_config() -> Config {
    let mut config = Config::default();
    config.resolver.enabled = false;
    config
}
