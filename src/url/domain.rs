/// Maximum length of a full hostname
const MAX_HOSTNAME_LEN: usize = 253;

/// Maximum length of a single DNS label
const MAX_LABEL_LEN: usize = 63;

/// Checks whether a (lowercased, ASCII) hostname is syntactically valid
///
/// Labels may contain ASCII letters, digits, hyphens and underscores
/// (underscores show up in real-world subdomains such as `_dmarc`), must not
/// be empty, must not start or end with a hyphen, and are limited to 63
/// characters. A single trailing dot is accepted.
///
/// # Examples
///
/// ```
/// use subprobe::url::is_valid_hostname;
///
/// assert!(is_valid_hostname("api.example.com"));
/// assert!(is_valid_hostname("localhost"));
/// assert!(!is_valid_hostname("bad!!domain"));
/// assert!(!is_valid_hostname("-leading.example.com"));
/// ```
pub fn is_valid_hostname(host: &str) -> bool {
    let host = host.strip_suffix('.').unwrap_or(host);

    if host.is_empty() || host.len() > MAX_HOSTNAME_LEN {
        return false;
    }

    host.split('.').all(is_valid_label)
}

fn is_valid_label(label: &str) -> bool {
    !label.is_empty()
        && label.len() <= MAX_LABEL_LEN
        && !label.starts_with('-')
        && !label.ends_with('-')
        && label
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
