use crate::config::types::{
    Config, InspectConfig, ProbeConfig, ProgressConfig, ScreenshotConfig, ScreenshotMode,
};
use crate::ConfigError;
use regex::RegexBuilder;
use std::collections::HashSet;

/// Upper bound on the concurrency width
const MAX_CONCURRENCY: usize = 1000;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_probe_config(&config.probe)?;
    validate_inspect_config(&config.inspect)?;
    validate_screenshot_config(&config.screenshot)?;
    validate_progress_config(&config.progress)?;
    Ok(())
}

/// Validates liveness check configuration
fn validate_probe_config(config: &ProbeConfig) -> Result<(), ConfigError> {
    if config.concurrency < 1 || config.concurrency > MAX_CONCURRENCY {
        return Err(ConfigError::Validation(format!(
            "concurrency must be between 1 and {}, got {}",
            MAX_CONCURRENCY, config.concurrency
        )));
    }

    if config.timeout_ms < 100 {
        return Err(ConfigError::Validation(format!(
            "timeout-ms must be >= 100ms, got {}ms",
            config.timeout_ms
        )));
    }

    if config.schemes.is_empty() {
        return Err(ConfigError::Validation(
            "schemes must list at least one of \"https\" or \"http\"".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for scheme in &config.schemes {
        if !seen.insert(scheme) {
            return Err(ConfigError::Validation(format!(
                "scheme '{}' listed more than once",
                scheme
            )));
        }
    }

    if config.max_redirects > 20 {
        return Err(ConfigError::Validation(format!(
            "max-redirects must be <= 20, got {}",
            config.max_redirects
        )));
    }

    if config.max_body_bytes < 1024 {
        return Err(ConfigError::Validation(format!(
            "max-body-bytes must be >= 1024, got {}",
            config.max_body_bytes
        )));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates page classification rules
fn validate_inspect_config(config: &InspectConfig) -> Result<(), ConfigError> {
    for rule in &config.rules {
        if rule.page_type.trim().is_empty() {
            return Err(ConfigError::Validation(
                "page rule page-type cannot be empty".to_string(),
            ));
        }

        RegexBuilder::new(&rule.pattern)
            .case_insensitive(true)
            .build()
            .map_err(|e| {
                ConfigError::InvalidPattern(format!(
                    "rule '{}' pattern '{}': {}",
                    rule.page_type, rule.pattern, e
                ))
            })?;
    }

    Ok(())
}

/// Validates screenshot configuration
fn validate_screenshot_config(config: &ScreenshotConfig) -> Result<(), ConfigError> {
    if config.mode == ScreenshotMode::Off {
        return Ok(());
    }

    if config.browser.trim().is_empty() {
        return Err(ConfigError::Validation(
            "screenshot browser cannot be empty".to_string(),
        ));
    }

    if config.timeout_ms < 1000 {
        return Err(ConfigError::Validation(format!(
            "screenshot timeout-ms must be >= 1000ms, got {}ms",
            config.timeout_ms
        )));
    }

    validate_window_size(&config.window_size)
}

/// Validates a "width,height" window size
fn validate_window_size(size: &str) -> Result<(), ConfigError> {
    let parts: Vec<&str> = size.split(',').collect();
    let valid = parts.len() == 2
        && parts
            .iter()
            .all(|p| p.trim().parse::<u32>().map(|v| v > 0).unwrap_or(false));

    if !valid {
        return Err(ConfigError::Validation(format!(
            "window-size must look like \"1280,800\", got '{}'",
            size
        )));
    }

    Ok(())
}

/// Validates progress display configuration
fn validate_progress_config(config: &ProgressConfig) -> Result<(), ConfigError> {
    if config.interval_ms < 50 {
        return Err(ConfigError::Validation(format!(
            "progress interval-ms must be >= 50ms, got {}ms",
            config.interval_ms
        )));
    }
    Ok(())
}
