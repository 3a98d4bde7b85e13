//! Target handling module for Subprobe
//!
//! This module turns raw input lines into probe targets: it validates the
//! hostname, remembers whether the input carried an explicit scheme, and
//! produces the candidate URLs the prober tries in order.

mod domain;
mod normalize;

use serde::Deserialize;
use std::fmt;
use url::Url;

// Re-export main functions
pub use domain::is_valid_hostname;
pub use normalize::parse_target;

/// URL schemes the prober can use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    Https,
    Http,
}

impl Scheme {
    /// Returns the scheme as it appears in a URL
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Https => "https",
            Self::Http => "http",
        }
    }

    /// Parses a scheme name (case-insensitive)
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "https" => Some(Self::Https),
            "http" => Some(Self::Http),
            _ => None,
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated domain ready to be probed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeTarget {
    /// The input line as read (trimmed)
    pub input: String,

    /// Lowercased host (IPv6 addresses keep their brackets)
    pub host: String,

    /// Scheme given in the input, if any
    pub scheme: Option<Scheme>,

    /// Port given in the input, if any
    pub port: Option<u16>,

    base: Url,
}

impl ProbeTarget {
    /// Returns the URLs to try, in order
    ///
    /// An explicit scheme in the input wins over the configured trial order.
    /// Otherwise one URL is produced per configured scheme.
    ///
    /// # Examples
    ///
    /// ```
    /// use subprobe::url::{parse_target, Scheme};
    ///
    /// let target = parse_target("api.example.com:8443/health").unwrap();
    /// let urls = target.candidate_urls(&[Scheme::Https, Scheme::Http]);
    /// assert_eq!(urls[0].as_str(), "https://api.example.com:8443/health");
    /// assert_eq!(urls[1].as_str(), "http://api.example.com:8443/health");
    /// ```
    pub fn candidate_urls(&self, schemes: &[Scheme]) -> Vec<Url> {
        match self.scheme {
            Some(scheme) => vec![self.url_for(scheme)],
            None => schemes.iter().map(|s| self.url_for(*s)).collect(),
        }
    }

    /// Returns the URL for one scheme, keeping host, port and path
    pub fn url_for(&self, scheme: Scheme) -> Url {
        let mut url = self.base.clone();
        // Switching between the two special schemes cannot fail.
        let _ = url.set_scheme(scheme.as_str());
        if self.port.is_some() {
            let _ = url.set_port(self.port);
        }
        url
    }
}
