//! Periodic progress reporting
//!
//! The reporter is a spawned task that samples the shared completion counter
//! on a fixed interval and hands a [`ProgressSnapshot`] to a [`ProgressSink`].
//! It only ever reads the counter.

use indicatif::{ProgressBar, ProgressStyle};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// One sample of run progress
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressSnapshot {
    pub processed: usize,
    pub total: usize,
    pub elapsed: Duration,
}

impl ProgressSnapshot {
    /// Completion percentage; 100 for an empty run
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            100.0
        } else {
            self.processed as f64 / self.total as f64 * 100.0
        }
    }
}

/// Destination for progress samples
pub trait ProgressSink: Send + 'static {
    fn update(&mut self, snapshot: &ProgressSnapshot);

    /// Called once when reporting ends, if anything was emitted
    fn finish(&mut self) {}
}

const BAR_TEMPLATE: &str = "{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}";

/// Progress bar on stderr
#[derive(Debug)]
pub struct ConsoleProgress {
    bar: ProgressBar,
}

impl ConsoleProgress {
    pub fn new() -> Self {
        Self::with_bar(ProgressBar::new(0))
    }

    fn with_bar(bar: ProgressBar) -> Self {
        match ProgressStyle::default_bar().template(BAR_TEMPLATE) {
            Ok(style) => bar.set_style(style.progress_chars("#>-")),
            Err(e) => tracing::debug!("Invalid progress template: {}", e),
        }
        Self { bar }
    }
}

impl Default for ConsoleProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressSink for ConsoleProgress {
    fn update(&mut self, snapshot: &ProgressSnapshot) {
        self.bar.set_length(snapshot.total as u64);
        self.bar.set_position(snapshot.processed as u64);
        self.bar
            .set_message(format!("elapsed {:.1}s", snapshot.elapsed.as_secs_f64()));
    }

    fn finish(&mut self) {
        self.bar.finish_and_clear();
    }
}

/// Logs progress samples at debug level
#[derive(Debug, Default)]
pub struct LogProgress;

impl ProgressSink for LogProgress {
    fn update(&mut self, snapshot: &ProgressSnapshot) {
        tracing::debug!(
            "Progress: {:.1}% ({}/{}) elapsed {:.1}s",
            snapshot.percent(),
            snapshot.processed,
            snapshot.total,
            snapshot.elapsed.as_secs_f64()
        );
    }
}

/// Handle to a running reporter
pub struct ProgressHandle {
    stop: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl ProgressHandle {
    /// Signals the reporter to stop and waits for it to exit
    ///
    /// Nothing is emitted to the sink after this returns.
    pub async fn stop(mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        if let Err(e) = (&mut self.task).await {
            tracing::warn!("Progress reporter failed: {}", e);
        }
    }

    /// Returns true once the reporter task has exited
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

/// Starts a reporter for a run of `total` domains
///
/// The reporter exits on its own once `counter` reaches `total`, or when the
/// handle is stopped. With `total == 0` it exits immediately without emitting.
pub fn start(
    counter: Arc<AtomicUsize>,
    total: usize,
    start_time: Instant,
    interval: Duration,
    mut sink: Box<dyn ProgressSink>,
) -> ProgressHandle {
    let (stop_tx, mut stop_rx) = oneshot::channel::<()>();

    let task = tokio::spawn(async move {
        if total == 0 {
            return;
        }

        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately
        ticker.tick().await;

        let mut emitted = false;
        loop {
            tokio::select! {
                biased;
                _ = &mut stop_rx => break,
                _ = ticker.tick() => {
                    let processed = counter.load(Ordering::Acquire);
                    if processed >= total {
                        break;
                    }
                    sink.update(&ProgressSnapshot {
                        processed,
                        total,
                        elapsed: start_time.elapsed(),
                    });
                    emitted = true;
                }
            }
        }

        if emitted {
            sink.finish();
        }
    });

    ProgressHandle {
        stop: Some(stop_tx),
        task,
    }
}
