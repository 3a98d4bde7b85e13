//! Report writer traits and types

use crate::probe::{ProbeResult, RunSummary};
use thiserror::Error;

/// Errors that can occur while writing reports
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Spreadsheet error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// A destination for the results of a completed run
pub trait ReportWriter {
    /// Short name used in log messages (e.g. "csv")
    fn name(&self) -> &'static str;

    /// Writes the full report
    ///
    /// # Arguments
    ///
    /// * `results` - Results in completion order
    /// * `summary` - Totals over all results, independent of any filtering
    fn write(&self, results: &[ProbeResult], summary: &RunSummary) -> OutputResult<()>;
}

/// Results a writer should include
pub fn selected<'a>(
    results: &'a [ProbeResult],
    only_alive: bool,
) -> impl Iterator<Item = &'a ProbeResult> + 'a {
    results.iter().filter(move |r| !only_alive || r.alive)
}
