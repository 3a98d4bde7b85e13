//! Dispatcher - runs one probing pass over a domain list
//!
//! Each domain is handled by its own task that holds one permit of a bounded
//! semaphore for its whole lifetime (probe, inspection, screenshot, record).
//! Panicking tasks are turned into error results after the join, so every
//! input produces exactly one result.

use crate::config::{Config, ScreenshotMode};
use crate::probe::accumulator::{ResultAccumulator, RunSummary};
use crate::probe::inspector::PageInspector;
use crate::probe::progress::{self, ProgressSink};
use crate::probe::prober::{HttpProber, Probe};
use crate::probe::result::ProbeResult;
use crate::probe::screenshot::{HeadlessBrowserAgent, NoopScreenshotAgent, ScreenshotAgent};
use crate::SubprobeError;
use std::any::Any;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinHandle};

/// Everything a run produced
#[derive(Debug, Clone)]
pub struct RunReport {
    /// One result per input domain, in completion order
    pub results: Vec<ProbeResult>,
    pub summary: RunSummary,
}

/// Shared, read-only pieces a probe task needs
struct TaskContext<P> {
    prober: Arc<P>,
    inspector: Option<Arc<PageInspector>>,
    screenshots: Arc<dyn ScreenshotAgent>,
    screenshot_mode: ScreenshotMode,
}

impl<P> Clone for TaskContext<P> {
    fn clone(&self) -> Self {
        Self {
            prober: Arc::clone(&self.prober),
            inspector: self.inspector.clone(),
            screenshots: Arc::clone(&self.screenshots),
            screenshot_mode: self.screenshot_mode,
        }
    }
}

/// Fans domains out to a bounded pool of probe tasks
pub struct Dispatcher<P: Probe> {
    context: TaskContext<P>,
    concurrency: usize,
    progress_interval: Duration,
}

impl Dispatcher<HttpProber> {
    /// Builds a dispatcher with the HTTP prober, inspector and screenshot
    /// agent described by the configuration
    pub fn from_config(config: &Config) -> Result<Self, SubprobeError> {
        let prober = HttpProber::new(&config.probe)?.with_body(config.inspect.enabled);
        let mut dispatcher = Self::new(prober, config);

        if config.inspect.enabled {
            dispatcher = dispatcher.with_inspector(PageInspector::from_config(&config.inspect)?);
        }

        if config.screenshot.mode != ScreenshotMode::Off {
            let agent = HeadlessBrowserAgent::new(&config.screenshot, &config.probe.schemes);
            dispatcher = dispatcher.with_screenshot_agent(config.screenshot.mode, agent);
        }

        Ok(dispatcher)
    }
}

impl<P: Probe> Dispatcher<P> {
    /// Creates a dispatcher with inspection and screenshots disabled
    pub fn new(prober: P, config: &Config) -> Self {
        Self {
            context: TaskContext {
                prober: Arc::new(prober),
                inspector: None,
                screenshots: Arc::new(NoopScreenshotAgent),
                screenshot_mode: ScreenshotMode::Off,
            },
            concurrency: config.probe.concurrency.max(1),
            progress_interval: config.progress.interval(),
        }
    }

    /// Enables page inspection for alive domains
    pub fn with_inspector(mut self, inspector: PageInspector) -> Self {
        self.context.inspector = Some(Arc::new(inspector));
        self
    }

    /// Enables screenshot capture
    pub fn with_screenshot_agent(
        mut self,
        mode: ScreenshotMode,
        agent: impl ScreenshotAgent,
    ) -> Self {
        self.context.screenshots = Arc::new(agent);
        self.context.screenshot_mode = mode;
        self
    }

    /// Overrides the pool width
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Probes every domain exactly once, without progress output
    pub async fn run(&self, domains: &[String]) -> RunReport {
        self.run_with_progress(domains, None).await
    }

    /// Probes every domain exactly once
    ///
    /// Returns after every domain has produced a result. If a sink is given,
    /// a progress reporter samples the completion counter for the duration of
    /// the run and is stopped before this returns.
    pub async fn run_with_progress(
        &self,
        domains: &[String],
        sink: Option<Box<dyn ProgressSink>>,
    ) -> RunReport {
        let total = domains.len();
        let accumulator = Arc::new(ResultAccumulator::new());
        let counter = Arc::new(AtomicUsize::new(0));
        let semaphore = Arc::new(Semaphore::new(self.concurrency));

        tracing::info!(
            "Probing {} domains with concurrency {}",
            total,
            self.concurrency
        );

        let reporter = sink.map(|sink| {
            progress::start(
                Arc::clone(&counter),
                total,
                accumulator.start_time(),
                self.progress_interval,
                sink,
            )
        });

        let mut tasks: Vec<(String, Instant, JoinHandle<()>)> = Vec::with_capacity(total);

        for domain in domains {
            // Wait for a free slot before spawning
            let Ok(permit) = Arc::clone(&semaphore).acquire_owned().await else {
                break;
            };

            let context = self.context.clone();
            let accumulator = Arc::clone(&accumulator);
            let counter = Arc::clone(&counter);
            let task_domain = domain.clone();

            let handle = tokio::spawn(async move {
                let _permit = permit;
                let result = process_domain(&context, &task_domain).await;
                accumulator.add(result);
                counter.fetch_add(1, Ordering::AcqRel);
            });

            tasks.push((domain.clone(), Instant::now(), handle));
        }

        for (domain, started, handle) in tasks {
            if let Err(e) = handle.await {
                let payload = join_error_message(e);
                tracing::error!("Probe task for {} panicked: {}", domain, payload);
                accumulator.add(ProbeResult::panicked(&domain, payload, started.elapsed()));
                counter.fetch_add(1, Ordering::AcqRel);
            }
        }

        if let Some(reporter) = reporter {
            reporter.stop().await;
        }

        let summary = accumulator.snapshot();
        let results = match Arc::try_unwrap(accumulator) {
            Ok(accumulator) => accumulator.into_results(),
            Err(shared) => shared.take_results(),
        };

        tracing::info!(
            "Run complete: {} alive, {} dead in {:.2}s",
            summary.alive,
            summary.dead,
            summary.elapsed.as_secs_f64()
        );

        RunReport { results, summary }
    }
}

/// Full pipeline for one domain: probe, inspect, screenshot
async fn process_domain<P: Probe>(context: &TaskContext<P>, domain: &str) -> ProbeResult {
    let probed = context.prober.check(domain).await;
    let mut result = probed.result;

    if result.alive {
        if let Some(inspector) = &context.inspector {
            let body = probed.body.as_deref().unwrap_or_default();
            result.page_info = Some(inspector.inspect(body));
        }
    }
    debug_assert!(result.alive || result.page_info.is_none());

    if context.screenshot_mode.should_capture(result.alive) && !result.is_invalid() {
        result.screenshot = context.screenshots.capture(domain).await;
    }

    result
}

/// Extracts a readable message from a failed join
fn join_error_message(error: JoinError) -> String {
    if error.is_panic() {
        panic_payload(error.into_panic())
    } else {
        error.to_string()
    }
}

fn panic_payload(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

impl<P: Probe> std::fmt::Debug for Dispatcher<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("concurrency", &self.concurrency)
            .field("inspect", &self.context.inspector.is_some())
            .field("screenshot_mode", &self.context.screenshot_mode)
            .finish()
    }
}
