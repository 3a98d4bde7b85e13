//! Thread-safe collection of completed probe results

use crate::probe::result::ProbeResult;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// Aggregate statistics over a batch of results
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub total: usize,
    pub alive: usize,
    pub dead: usize,

    /// Count of alive domains per observed page type
    pub page_types: HashMap<String, usize>,

    /// Number of screenshots successfully written
    pub screenshots: usize,

    /// Wall time since the run started
    pub elapsed: Duration,
}

impl RunSummary {
    /// Page types sorted by descending count, then name
    pub fn page_types_sorted(&self) -> Vec<(&str, usize)> {
        let mut types: Vec<_> = self
            .page_types
            .iter()
            .map(|(name, count)| (name.as_str(), *count))
            .collect();
        types.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        types
    }

    /// Alive domains as a percentage of the total (0 for an empty run)
    pub fn alive_percent(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.alive as f64 / self.total as f64 * 100.0
        }
    }
}

#[derive(Debug, Default)]
struct Inner {
    results: Vec<ProbeResult>,
    total: usize,
    alive: usize,
    dead: usize,
    page_types: HashMap<String, usize>,
    screenshots: usize,
}

/// Accumulates results from concurrently running probe tasks
///
/// Each `add` updates the result list and every counter inside one critical
/// section, so a snapshot never observes a half-recorded result.
#[derive(Debug)]
pub struct ResultAccumulator {
    inner: Mutex<Inner>,
    started: Instant,
}

impl ResultAccumulator {
    /// Creates an empty accumulator; the run clock starts now
    pub fn new() -> Self {
        Self::started_at(Instant::now())
    }

    pub fn started_at(started: Instant) -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            started,
        }
    }

    /// Instant the run started
    pub fn start_time(&self) -> Instant {
        self.started
    }

    /// Records one completed result
    pub fn add(&self, result: ProbeResult) {
        let mut inner = self.lock();

        inner.total += 1;
        if result.alive {
            inner.alive += 1;
            if let Some(info) = &result.page_info {
                *inner.page_types.entry(info.page_type.clone()).or_insert(0) += 1;
            }
        } else {
            inner.dead += 1;
        }
        if result.screenshot.is_some() {
            inner.screenshots += 1;
        }

        inner.results.push(result);
    }

    /// Current aggregate statistics
    pub fn snapshot(&self) -> RunSummary {
        let inner = self.lock();

        RunSummary {
            total: inner.total,
            alive: inner.alive,
            dead: inner.dead,
            page_types: inner.page_types.clone(),
            screenshots: inner.screenshots,
            elapsed: self.started.elapsed(),
        }
    }

    /// Number of results recorded so far
    pub fn len(&self) -> usize {
        self.lock().results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Consumes the accumulator, returning results in completion order
    pub fn into_results(self) -> Vec<ProbeResult> {
        self.inner
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
            .results
    }

    /// Moves the results out, leaving the counters untouched
    pub fn take_results(&self) -> Vec<ProbeResult> {
        std::mem::take(&mut self.lock().results)
    }

    // Nothing panics while holding the lock; poisoning is ignored.
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for ResultAccumulator {
    fn default() -> Self {
        Self::new()
    }
}
