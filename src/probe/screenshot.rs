//! Screenshot capture
//!
//! Captures are best effort: any failure (missing browser, non-zero exit,
//! timeout, empty image) yields `None` and never affects liveness.

use crate::config::ScreenshotConfig;
use crate::url::{parse_target, Scheme};
use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// Produces an image file for a domain
#[async_trait]
pub trait ScreenshotAgent: Send + Sync + 'static {
    /// Returns the path of the written image, or `None` if capture failed
    async fn capture(&self, domain: &str) -> Option<PathBuf>;
}

/// Agent used when screenshots are disabled
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopScreenshotAgent;

#[async_trait]
impl ScreenshotAgent for NoopScreenshotAgent {
    async fn capture(&self, _domain: &str) -> Option<PathBuf> {
        None
    }
}

/// Captures pages by running a headless Chromium-compatible browser
#[derive(Debug, Clone)]
pub struct HeadlessBrowserAgent {
    browser: String,
    output_dir: PathBuf,
    window_size: String,
    timeout: Duration,
    schemes: Vec<Scheme>,
}

impl HeadlessBrowserAgent {
    pub fn new(config: &ScreenshotConfig, schemes: &[Scheme]) -> Self {
        Self {
            browser: config.browser.clone(),
            output_dir: config.output_dir.clone(),
            window_size: config.window_size.clone(),
            timeout: config.timeout(),
            schemes: schemes.to_vec(),
        }
    }

    /// Path the image for `domain` is written to
    pub fn image_path(&self, domain: &str) -> PathBuf {
        self.output_dir
            .join(format!("{}.png", screenshot_file_stem(domain)))
    }

    async fn run_browser(&self, url: &str, path: &Path) -> bool {
        let mut command = Command::new(&self.browser);
        command
            .arg("--headless")
            .arg("--disable-gpu")
            .arg("--hide-scrollbars")
            .arg(format!("--window-size={}", self.window_size))
            .arg(format!("--screenshot={}", path.display()))
            .arg(url)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        let mut child = match command.spawn() {
            Ok(child) => child,
            Err(e) => {
                tracing::debug!("Failed to start {}: {}", self.browser, e);
                return false;
            }
        };

        match tokio::time::timeout(self.timeout, child.wait()).await {
            Ok(Ok(status)) if status.success() => true,
            Ok(Ok(status)) => {
                tracing::debug!("{} exited with {} for {}", self.browser, status, url);
                false
            }
            Ok(Err(e)) => {
                tracing::debug!("Waiting for {} failed: {}", self.browser, e);
                false
            }
            Err(_) => {
                tracing::debug!("Screenshot of {} timed out after {:?}", url, self.timeout);
                let _ = child.start_kill();
                false
            }
        }
    }
}

#[async_trait]
impl ScreenshotAgent for HeadlessBrowserAgent {
    async fn capture(&self, domain: &str) -> Option<PathBuf> {
        let target = parse_target(domain).ok()?;
        let url = target.candidate_urls(&self.schemes).into_iter().next()?;

        if let Err(e) = tokio::fs::create_dir_all(&self.output_dir).await {
            tracing::warn!(
                "Cannot create screenshot directory {}: {}",
                self.output_dir.display(),
                e
            );
            return None;
        }

        // An image from an earlier run must not pass for a fresh capture
        let path = self.image_path(domain);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => tracing::debug!("Removed stale screenshot {}", path.display()),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!("Cannot replace screenshot {}: {}", path.display(), e);
                return None;
            }
        }

        if !self.run_browser(url.as_str(), &path).await {
            return None;
        }

        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.len() > 0 => {
                tracing::debug!("Captured {} to {}", domain, path.display());
                Some(path)
            }
            _ => {
                tracing::debug!("Browser produced no image for {}", domain);
                None
            }
        }
    }
}

/// Maps a domain to a file-name-safe stem
///
/// Everything outside `[A-Za-z0-9.-]` becomes `_`. When that changes the
/// input, a short hash of the original is appended so that `a.com:8080` and
/// `a.com_8080` get different files.
pub fn screenshot_file_stem(domain: &str) -> String {
    let domain = domain.trim();
    let stem: String = domain
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if stem == domain {
        return stem;
    }

    let digest = hex::encode(Sha256::digest(domain.as_bytes()));
    format!("{}-{}", stem, &digest[..8])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScreenshotMode;
    use tempfile::TempDir;

    fn agent(browser: &str, dir: &Path) -> HeadlessBrowserAgent {
        let config = ScreenshotConfig {
            mode: ScreenshotMode::All,
            output_dir: dir.to_path_buf(),
            browser: browser.to_string(),
            timeout_ms: 5_000,
            window_size: "800,600".to_string(),
        };
        HeadlessBrowserAgent::new(&config, &[Scheme::Https, Scheme::Http])
    }

    #[test]
    fn test_file_stem() {
        assert_eq!(screenshot_file_stem("www.example.com"), "www.example.com");
        assert_eq!(screenshot_file_stem(" a-b.example.com "), "a-b.example.com");

        let stem = screenshot_file_stem("https://example.com:8443/x");
        assert!(stem.starts_with("https___example.com_8443_x-"));
        assert_eq!(stem.len(), "https___example.com_8443_x-".len() + 8);
        assert_eq!(stem, screenshot_file_stem("https://example.com:8443/x"));
    }

    #[test]
    fn test_file_stem_keeps_ports_apart() {
        assert_eq!(screenshot_file_stem("a.com_8080"), "a.com_8080");
        assert_ne!(
            screenshot_file_stem("a.com:8080"),
            screenshot_file_stem("a.com_8080")
        );
    }

    #[test]
    fn test_image_path() {
        let dir = TempDir::new().unwrap();
        let agent = agent("chromium", dir.path());
        assert_eq!(
            agent.image_path("api.example.com"),
            dir.path().join("api.example.com.png")
        );
    }

    #[tokio::test]
    async fn test_noop_agent() {
        assert!(NoopScreenshotAgent.capture("example.com").await.is_none());
    }

    #[tokio::test]
    async fn test_missing_browser() {
        let dir = TempDir::new().unwrap();
        let agent = agent("subprobe-no-such-browser-binary", dir.path());
        assert!(agent.capture("example.com").await.is_none());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_browser_writing_nothing() {
        let dir = TempDir::new().unwrap();
        let agent = agent("true", dir.path());
        assert!(agent.capture("example.com").await.is_none());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_stale_image_not_reported() {
        let dir = TempDir::new().unwrap();
        let agent = agent("true", dir.path());
        let stale = agent.image_path("example.com");
        std::fs::write(&stale, b"old image").unwrap();

        assert!(agent.capture("example.com").await.is_none());
        assert!(!stale.exists());
    }

    #[tokio::test]
    async fn test_invalid_domain() {
        let dir = TempDir::new().unwrap();
        let agent = agent("true", dir.path());
        assert!(agent.capture("bad!!domain").await.is_none());
    }
}
