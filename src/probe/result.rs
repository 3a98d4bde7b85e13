//! Probe result types
//!
//! One [`ProbeResult`] is produced per input domain. Network failures are
//! never errors at this level; they are recorded as a [`FailureKind`] with a
//! human-readable message.

use reqwest::StatusCode;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Page type used when no classification rule matches
pub const UNKNOWN_PAGE_TYPE: &str = "unknown";

/// Extracted page metadata for an alive domain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageInfo {
    /// Coarse page classification (e.g. "login page")
    pub page_type: String,

    /// Page title; empty if none was found
    pub title: String,
}

impl PageInfo {
    /// Page info for a response that could not be inspected
    pub fn unknown() -> Self {
        Self {
            page_type: UNKNOWN_PAGE_TYPE.to_string(),
            title: String::new(),
        }
    }
}

/// Why a domain was classified as dead
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    /// The input line does not name a valid host
    InvalidDomain,
    /// The request did not complete within the timeout
    Timeout,
    /// Host name resolution failed
    Dns,
    /// The remote host refused the connection
    ConnectionRefused,
    /// TLS negotiation failed
    Tls,
    /// The connection was reset or aborted
    ConnectionReset,
    /// Any other connection-level failure
    Connect,
    /// The redirect limit was exceeded
    TooManyRedirects,
    /// The final response had a non-2xx/3xx status
    HttpStatus(u16),
    /// The request failed for another reason
    Request,
    /// The probe task panicked
    Panicked(String),
}

impl FailureKind {
    /// Returns true if the next scheme should be tried after this failure
    ///
    /// Timeouts never fall back so that a single check stays within its
    /// deadline.
    pub fn allows_fallback(&self) -> bool {
        matches!(
            self,
            Self::Dns | Self::ConnectionRefused | Self::Tls | Self::ConnectionReset | Self::Connect
        )
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDomain => f.write_str("invalid domain"),
            Self::Timeout => f.write_str("timeout"),
            Self::Dns => f.write_str("dns error"),
            Self::ConnectionRefused => f.write_str("connection refused"),
            Self::Tls => f.write_str("tls error"),
            Self::ConnectionReset => f.write_str("connection reset"),
            Self::Connect => f.write_str("connection failed"),
            Self::TooManyRedirects => f.write_str("too many redirects"),
            Self::HttpStatus(code) => write!(f, "HTTP {}", code),
            Self::Request => f.write_str("request failed"),
            Self::Panicked(payload) => write!(f, "task panicked: {}", payload),
        }
    }
}

/// Outcome of probing a single domain
#[derive(Debug, Clone)]
pub struct ProbeResult {
    /// The domain exactly as given in the input
    pub domain: String,

    /// True if a 2xx/3xx response was received within the timeout
    pub alive: bool,

    /// Final HTTP status code, or 0 if no response was received
    pub status: u16,

    /// Human-readable outcome (e.g. "200 OK", "unreachable")
    pub status_text: String,

    /// Wall time until the response headers arrived or the failure was detected
    pub response_time: Duration,

    /// URL of the final response after redirects
    pub final_url: Option<String>,

    /// Title and page type; only ever present for alive domains
    pub page_info: Option<PageInfo>,

    /// Path of the captured screenshot
    pub screenshot: Option<PathBuf>,

    /// Diagnostic text; empty for alive domains
    pub message: String,

    /// Failure category for dead domains
    pub failure: Option<FailureKind>,
}

impl ProbeResult {
    /// Result for a domain that answered with a 2xx/3xx status
    pub fn alive(
        domain: &str,
        status: StatusCode,
        final_url: String,
        response_time: Duration,
    ) -> Self {
        Self {
            domain: domain.to_string(),
            alive: true,
            status: status.as_u16(),
            status_text: status_text(status),
            response_time,
            final_url: Some(final_url),
            page_info: None,
            screenshot: None,
            message: String::new(),
            failure: None,
        }
    }

    /// Result for a domain that answered with an error status
    pub fn http_error(
        domain: &str,
        status: StatusCode,
        final_url: String,
        response_time: Duration,
    ) -> Self {
        let failure = FailureKind::HttpStatus(status.as_u16());
        Self {
            domain: domain.to_string(),
            alive: false,
            status: status.as_u16(),
            status_text: status_text(status),
            response_time,
            final_url: Some(final_url),
            page_info: None,
            screenshot: None,
            message: failure.to_string(),
            failure: Some(failure),
        }
    }

    /// Result for a domain that could not be reached at all
    pub fn unreachable(domain: &str, failure: FailureKind, response_time: Duration) -> Self {
        Self::dead(domain, "unreachable", failure, response_time)
    }

    /// Result for an input line that is not a valid domain
    pub fn invalid(domain: &str) -> Self {
        Self::dead(domain, "invalid", FailureKind::InvalidDomain, Duration::ZERO)
    }

    /// Result for a probe task that panicked
    pub fn panicked(domain: &str, payload: String, response_time: Duration) -> Self {
        Self::dead(domain, "error", FailureKind::Panicked(payload), response_time)
    }

    fn dead(domain: &str, status_text: &str, failure: FailureKind, response_time: Duration) -> Self {
        Self {
            domain: domain.to_string(),
            alive: false,
            status: 0,
            status_text: status_text.to_string(),
            response_time,
            final_url: None,
            page_info: None,
            screenshot: None,
            message: failure.to_string(),
            failure: Some(failure),
        }
    }

    /// Returns true if the input was rejected before any network I/O
    pub fn is_invalid(&self) -> bool {
        matches!(self.failure, Some(FailureKind::InvalidDomain))
    }

    /// Page type, or an empty string when no page info was extracted
    pub fn page_type(&self) -> &str {
        self.page_info
            .as_ref()
            .map(|info| info.page_type.as_str())
            .unwrap_or("")
    }

    /// Page title, or an empty string when no page info was extracted
    pub fn title(&self) -> &str {
        self.page_info
            .as_ref()
            .map(|info| info.title.as_str())
            .unwrap_or("")
    }
}

/// Formats a status code as "<code> <reason>"
fn status_text(status: StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => format!("{} {}", status.as_u16(), reason),
        None => status.as_u16().to_string(),
    }
}
