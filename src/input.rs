//! Domain list loading

use crate::SubprobeError;
use std::path::Path;

/// Reads a domain list file
///
/// One domain per line. Lines are trimmed; blank lines and `#` comments are
/// skipped. Order is preserved and duplicates are kept, so every line yields
/// exactly one result.
pub fn load_domains(path: &Path) -> Result<Vec<String>, SubprobeError> {
    let content = std::fs::read_to_string(path).map_err(|source| SubprobeError::Input {
        path: path.display().to_string(),
        source,
    })?;

    let domains = parse_domains(&content);
    tracing::debug!("Loaded {} domains from {}", domains.len(), path.display());

    Ok(domains)
}

/// Splits file content into domain entries
pub fn parse_domains(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}
