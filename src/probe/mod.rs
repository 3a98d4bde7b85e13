//! Probing engine
//!
//! This module contains the core liveness logic:
//! - HTTP(S) checks with scheme fallback and failure classification
//! - Page title extraction and rule-based page classification
//! - Optional screenshot capture via a headless browser
//! - A bounded-concurrency dispatcher with progress reporting
//! - Thread-safe result accumulation and run summaries

mod accumulator;
mod dispatcher;
mod inspector;
pub mod progress;
mod prober;
mod result;
mod screenshot;

pub use accumulator::{ResultAccumulator, RunSummary};
pub use dispatcher::{Dispatcher, RunReport};
pub use inspector::{PageInspector, PageRule};
pub use progress::{ConsoleProgress, LogProgress, ProgressHandle, ProgressSink, ProgressSnapshot};
pub use prober::{build_http_client, classify_error, HttpProber, Probe, Probed};
pub use result::{FailureKind, PageInfo, ProbeResult, UNKNOWN_PAGE_TYPE};
pub use screenshot::{
    screenshot_file_stem, HeadlessBrowserAgent, NoopScreenshotAgent, ScreenshotAgent,
};
