//! Subprobe: a concurrent subdomain liveness prober
//!
//! This crate checks a list of candidate subdomains over HTTP(S), classifies
//! each one as alive or dead, optionally extracts page metadata and a
//! screenshot, and aggregates the results for reporting.

pub mod config;
pub mod input;
pub mod output;
pub mod probe;
pub mod url;

use thiserror::Error;

/// Main error type for Subprobe operations
///
/// Per-domain failures never surface here; they are encoded into
/// [`probe::ProbeResult`]. These variants cover run-level problems only.
#[derive(Debug, Error)]
pub enum SubprobeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("Failed to read domain list {path}: {source}")]
    Input {
        path: String,
        source: std::io::Error,
    },
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid page rule pattern: {0}")]
    InvalidPattern(String),
}

/// Errors raised while turning an input line into a probe target
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UrlError {
    #[error("Empty domain")]
    Empty,

    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in {0}")]
    MissingDomain(String),

    #[error("Invalid hostname: {0}")]
    InvalidHost(String),
}

/// Result type alias for Subprobe operations
pub type Result<T> = std::result::Result<T, SubprobeError>;

// Re-export commonly used types
pub use config::Config;
pub use probe::{Dispatcher, PageInfo, ProbeResult, RunReport, RunSummary};
pub use url::{parse_target, ProbeTarget, Scheme};
