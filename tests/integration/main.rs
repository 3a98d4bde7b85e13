//! Integration tests for Subprobe
//!
//! These tests use wiremock to create mock HTTP servers and exercise the
//! prober, dispatcher and report writers end-to-end.

mod probe_tests;
mod report_tests;

use subprobe::config::{Config, ProbeConfig};

/// Creates a test configuration with the given timeout and concurrency
pub fn create_test_config(timeout_ms: u64, concurrency: usize) -> Config {
    Config {
        probe: ProbeConfig {
            timeout_ms,
            concurrency,
            ..ProbeConfig::default()
        },
        ..Config::default()
    }
}
