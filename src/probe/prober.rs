//! HTTP liveness prober
//!
//! This module handles all HTTP requests for the engine, including:
//! - Building the HTTP client from the probe configuration
//! - Trying the candidate schemes in order
//! - Reading a bounded amount of the response body
//! - Error classification

use crate::config::ProbeConfig;
use crate::probe::result::{FailureKind, ProbeResult};
use crate::url::{parse_target, Scheme};
use async_trait::async_trait;
use reqwest::{redirect::Policy, Client, Response};
use std::error::Error as StdError;
use std::io;
use std::time::{Duration, Instant};

/// Outcome of a single check: the result plus the body of an alive response
#[derive(Debug)]
pub struct Probed {
    pub result: ProbeResult,

    /// Response body (truncated to the configured limit); `None` for dead
    /// domains or when the body could not be read
    pub body: Option<Vec<u8>>,
}

impl Probed {
    /// A check that produced no body
    pub fn without_body(result: ProbeResult) -> Self {
        Self { result, body: None }
    }
}

/// A liveness check against one domain
///
/// Implementations must encode every per-domain failure into the returned
/// result instead of failing.
#[async_trait]
pub trait Probe: Send + Sync + 'static {
    async fn check(&self, domain: &str) -> Probed;
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use subprobe::config::ProbeConfig;
/// use subprobe::probe::build_http_client;
///
/// let client = build_http_client(&ProbeConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &ProbeConfig) -> Result<Client, reqwest::Error> {
    let redirect = if config.max_redirects == 0 {
        Policy::none()
    } else {
        Policy::limited(config.max_redirects)
    };

    Client::builder()
        .use_rustls_tls()
        .user_agent(config.user_agent.clone())
        .timeout(config.timeout())
        .connect_timeout(config.timeout())
        .redirect(redirect)
        .danger_accept_invalid_certs(config.accept_invalid_certs)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Prober backed by a shared reqwest client
pub struct HttpProber {
    client: Client,
    schemes: Vec<Scheme>,
    timeout: Duration,
    max_body_bytes: usize,
    read_bodies: bool,
}

impl HttpProber {
    /// Creates a prober, building its own HTTP client
    pub fn new(config: &ProbeConfig) -> Result<Self, reqwest::Error> {
        let client = build_http_client(config)?;
        Ok(Self::with_client(client, config))
    }

    /// Creates a prober around an existing client
    pub fn with_client(client: Client, config: &ProbeConfig) -> Self {
        Self {
            client,
            schemes: config.schemes.clone(),
            timeout: config.timeout(),
            max_body_bytes: config.max_body_bytes,
            read_bodies: true,
        }
    }

    /// Sets whether alive responses have their body read
    ///
    /// Bodies are only needed for page inspection.
    pub fn with_body(mut self, read_bodies: bool) -> Self {
        self.read_bodies = read_bodies;
        self
    }

    /// Turns a received response into a result, reading the body when alive
    async fn handle_response(&self, domain: &str, response: Response, start: Instant) -> Probed {
        let elapsed = start.elapsed();
        let status = response.status();
        let final_url = response.url().to_string();

        if !(status.is_success() || status.is_redirection()) {
            tracing::debug!("{} answered {} from {}", domain, status, final_url);
            return Probed::without_body(ProbeResult::http_error(
                domain, status, final_url, elapsed,
            ));
        }

        tracing::debug!("{} alive: {} from {} in {:?}", domain, status, final_url, elapsed);
        let result = ProbeResult::alive(domain, status, final_url, elapsed);
        if !self.read_bodies {
            return Probed::without_body(result);
        }

        match read_body(response, self.max_body_bytes).await {
            Ok(body) => Probed {
                result,
                body: Some(body),
            },
            Err(e) => {
                tracing::debug!("Failed to read body for {}: {}", domain, e);
                Probed::without_body(result)
            }
        }
    }
}

#[async_trait]
impl Probe for HttpProber {
    /// Checks one domain
    ///
    /// # Request Flow
    ///
    /// 1. Parse the input; an invalid domain returns immediately
    /// 2. For each candidate URL (explicit scheme, or the configured order):
    ///    - Send GET with the remaining share of the timeout
    ///    - Any HTTP response ends the loop
    ///    - Connection-level failures move on to the next scheme
    ///    - Timeouts and redirect-limit errors end the loop
    /// 3. The last failure becomes the result
    ///
    /// | Condition | Result |
    /// |-----------|--------|
    /// | 2xx / 3xx | alive, body read if enabled |
    /// | 4xx / 5xx | dead, status kept, "HTTP <code>" |
    /// | Timeout | dead, "timeout" |
    /// | DNS failure | dead, "dns error" |
    /// | Connection refused | dead, "connection refused" |
    /// | TLS/SSL error | dead, "tls error" |
    /// | Redirect limit | dead, "too many redirects" |
    async fn check(&self, domain: &str) -> Probed {
        let start = Instant::now();

        let target = match parse_target(domain) {
            Ok(target) => target,
            Err(e) => {
                tracing::debug!("Skipping invalid domain {:?}: {}", domain, e);
                return Probed::without_body(ProbeResult::invalid(domain));
            }
        };

        let mut failure = FailureKind::Connect;

        for url in target.candidate_urls(&self.schemes) {
            let remaining = self.timeout.saturating_sub(start.elapsed());
            if remaining.is_zero() {
                failure = FailureKind::Timeout;
                break;
            }

            tracing::trace!("Requesting {}", url);
            match self.client.get(url.clone()).timeout(remaining).send().await {
                Ok(response) => return self.handle_response(domain, response, start).await,
                Err(e) => {
                    failure = classify_error(&e);
                    tracing::debug!("Request to {} failed ({}): {}", url, failure, e);
                    if !failure.allows_fallback() {
                        break;
                    }
                }
            }
        }

        Probed::without_body(ProbeResult::unreachable(domain, failure, start.elapsed()))
    }
}

/// Reads at most `limit` bytes of the response body
async fn read_body(mut response: Response, limit: usize) -> Result<Vec<u8>, reqwest::Error> {
    let mut body = Vec::new();

    while let Some(chunk) = response.chunk().await? {
        let room = limit - body.len();
        if chunk.len() >= room {
            body.extend_from_slice(&chunk[..room]);
            break;
        }
        body.extend_from_slice(&chunk);
    }

    Ok(body)
}

/// Maps a reqwest error onto a failure category
pub fn classify_error(error: &reqwest::Error) -> FailureKind {
    if error.is_timeout() {
        return FailureKind::Timeout;
    }

    if error.is_redirect() {
        return FailureKind::TooManyRedirects;
    }

    // The top-level message embeds the URL, so only the causes are inspected.
    let from_chain = error.source().and_then(classify_source_chain);
    if error.is_connect() {
        return from_chain.unwrap_or(FailureKind::Connect);
    }

    from_chain.unwrap_or(FailureKind::Request)
}

/// Walks the error source chain looking for a recognizable cause
fn classify_source_chain(error: &(dyn StdError + 'static)) -> Option<FailureKind> {
    let mut current: Option<&(dyn StdError + 'static)> = Some(error);

    while let Some(err) = current {
        if let Some(io_err) = err.downcast_ref::<io::Error>() {
            match io_err.kind() {
                io::ErrorKind::ConnectionRefused => return Some(FailureKind::ConnectionRefused),
                io::ErrorKind::ConnectionReset | io::ErrorKind::ConnectionAborted => {
                    return Some(FailureKind::ConnectionReset)
                }
                io::ErrorKind::TimedOut => return Some(FailureKind::Timeout),
                _ => {}
            }
        }

        if let Some(kind) = classify_message(&err.to_string()) {
            return Some(kind);
        }

        current = err.source();
    }

    None
}

/// Recognizes resolver and TLS failures from their error text
fn classify_message(message: &str) -> Option<FailureKind> {
    let message = message.to_lowercase();

    const DNS_MARKERS: &[&str] = &[
        "dns error",
        "failed to lookup address",
        "name or service not known",
        "no such host",
        "nodename nor servname",
    ];
    const TLS_MARKERS: &[&str] = &[
        "certificate",
        "tls",
        "ssl",
        "handshake",
        "corrupt message",
    ];

    if DNS_MARKERS.iter().any(|m| message.contains(m)) {
        Some(FailureKind::Dns)
    } else if TLS_MARKERS.iter().any(|m| message.contains(m)) {
        Some(FailureKind::Tls)
    } else if message.contains("connection refused") {
        Some(FailureKind::ConnectionRefused)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_http_client() {
        let client = build_http_client(&ProbeConfig::default());
        assert!(client.is_ok());
    }

    #[test]
    fn test_build_client_without_redirects() {
        let config = ProbeConfig {
            max_redirects: 0,
            ..ProbeConfig::default()
        };
        assert!(build_http_client(&config).is_ok());
    }

    #[test]
    fn test_classify_message() {
        assert_eq!(
            classify_message("dns error: failed to lookup address information"),
            Some(FailureKind::Dns)
        );
        assert_eq!(
            classify_message("invalid peer certificate: UnknownIssuer"),
            Some(FailureKind::Tls)
        );
        assert_eq!(
            classify_message("Connection refused (os error 111)"),
            Some(FailureKind::ConnectionRefused)
        );
        assert_eq!(classify_message("something else entirely"), None);
    }

    #[test]
    fn test_classify_io_chain() {
        let err = io::Error::new(io::ErrorKind::ConnectionRefused, "refused");
        assert_eq!(
            classify_source_chain(&err),
            Some(FailureKind::ConnectionRefused)
        );

        let err = io::Error::new(io::ErrorKind::ConnectionReset, "reset by peer");
        assert_eq!(
            classify_source_chain(&err),
            Some(FailureKind::ConnectionReset)
        );
    }

    #[tokio::test]
    async fn test_invalid_domain_short_circuits() {
        let prober = HttpProber::new(&ProbeConfig::default()).unwrap();
        let start = Instant::now();

        let probed = prober.check("bad!!domain").await;

        assert!(start.elapsed() < Duration::from_millis(100));
        assert!(!probed.result.alive);
        assert_eq!(probed.result.message, "invalid domain");
        assert!(probed.body.is_none());
    }

    #[tokio::test]
    async fn test_empty_domain_is_invalid() {
        let prober = HttpProber::new(&ProbeConfig::default()).unwrap();
        let probed = prober.check("").await;
        assert!(probed.result.is_invalid());
    }
}
