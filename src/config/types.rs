use crate::url::Scheme;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure for Subprobe
///
/// Every section is optional in the TOML file; missing sections fall back to
/// their defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub probe: ProbeConfig,
    #[serde(default)]
    pub inspect: InspectConfig,
    #[serde(default)]
    pub screenshot: ScreenshotConfig,
    #[serde(default)]
    pub progress: ProgressConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Liveness check configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Maximum number of domain checks running at once
    pub concurrency: usize,

    /// Per-request timeout (milliseconds)
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,

    /// Scheme trial order for inputs without an explicit scheme
    pub schemes: Vec<Scheme>,

    /// Maximum number of redirects to follow
    #[serde(rename = "max-redirects")]
    pub max_redirects: usize,

    /// Maximum number of body bytes read for page inspection
    #[serde(rename = "max-body-bytes")]
    pub max_body_bytes: usize,

    /// Accept self-signed or otherwise invalid TLS certificates
    #[serde(rename = "accept-invalid-certs")]
    pub accept_invalid_certs: bool,

    /// User-Agent header sent with every request
    #[serde(rename = "user-agent")]
    pub user_agent: String,
}

impl ProbeConfig {
    /// Returns the per-request timeout as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            concurrency: 20,
            timeout_ms: 5_000,
            schemes: vec![Scheme::Https, Scheme::Http],
            max_redirects: 5,
            max_body_bytes: 1024 * 1024,
            accept_invalid_certs: false,
            user_agent: format!("subprobe/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Page inspection configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InspectConfig {
    /// Extract title and page type for alive domains
    pub enabled: bool,

    /// Include the built-in classification rules after the configured ones
    #[serde(rename = "default-rules")]
    pub default_rules: bool,

    /// Additional classification rules, evaluated in order
    #[serde(rename = "rule")]
    pub rules: Vec<PageRuleConfig>,
}

impl Default for InspectConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            default_rules: true,
            rules: Vec::new(),
        }
    }
}

/// A single page classification rule
#[derive(Debug, Clone, Deserialize)]
pub struct PageRuleConfig {
    /// Page type reported when the rule matches
    #[serde(rename = "page-type")]
    pub page_type: String,

    /// Case-insensitive regular expression
    pub pattern: String,

    /// What the pattern is matched against
    #[serde(default)]
    pub target: RuleTarget,
}

/// Text a page rule is evaluated against
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleTarget {
    /// The raw (decoded) response body
    #[default]
    Body,
    /// The extracted page title
    Title,
}

/// When screenshots are captured
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScreenshotMode {
    /// Never capture
    #[default]
    Off,
    /// Capture every domain with a valid input
    All,
    /// Capture alive domains only
    Alive,
}

impl ScreenshotMode {
    /// Returns true if a screenshot should be taken for a domain with the given liveness
    pub fn should_capture(&self, alive: bool) -> bool {
        match self {
            Self::Off => false,
            Self::All => true,
            Self::Alive => alive,
        }
    }
}

/// Screenshot capture configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScreenshotConfig {
    pub mode: ScreenshotMode,

    /// Directory the images are written to
    #[serde(rename = "output-dir")]
    pub output_dir: PathBuf,

    /// Headless browser executable
    pub browser: String,

    /// Capture timeout (milliseconds)
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,

    /// Browser window size as "width,height"
    #[serde(rename = "window-size")]
    pub window_size: String,
}

impl ScreenshotConfig {
    /// Returns the capture timeout as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for ScreenshotConfig {
    fn default() -> Self {
        Self {
            mode: ScreenshotMode::Off,
            output_dir: PathBuf::from("screenshots"),
            browser: "chromium".to_string(),
            timeout_ms: 30_000,
            window_size: "1280,800".to_string(),
        }
    }
}

/// Progress display configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProgressConfig {
    pub enabled: bool,

    /// Sampling interval (milliseconds)
    #[serde(rename = "interval-ms")]
    pub interval_ms: u64,
}

impl ProgressConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_ms: 500,
        }
    }
}

/// Report output configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Path to the CSV report
    #[serde(rename = "csv-path")]
    pub csv_path: Option<PathBuf>,

    /// Path to the HTML report
    #[serde(rename = "html-path")]
    pub html_path: Option<PathBuf>,

    /// Path to the SQLite report database
    #[serde(rename = "database-path")]
    pub database_path: Option<PathBuf>,

    /// Path to the spreadsheet report
    #[serde(rename = "xlsx-path")]
    pub xlsx_path: Option<PathBuf>,

    /// Only write alive domains to the reports
    #[serde(rename = "only-alive")]
    pub only_alive: bool,
}
