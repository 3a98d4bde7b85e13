//! Configuration module for Subprobe
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every section is optional, so an empty file (or no file at all) yields the
//! defaults.
//!
//! # Example
//!
//! ```no_run
//! use subprobe::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("subprobe.toml")).unwrap();
//! println!("Probing with concurrency: {}", config.probe.concurrency);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, InspectConfig, OutputConfig, PageRuleConfig, ProbeConfig, ProgressConfig,
    RuleTarget, ScreenshotConfig, ScreenshotMode,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;
