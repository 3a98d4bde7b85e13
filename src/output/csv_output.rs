//! CSV report

use crate::output::traits::{selected, OutputResult, ReportWriter};
use crate::probe::{ProbeResult, RunSummary};
use csv::Writer;
use std::path::PathBuf;

/// Column header, in output order
pub const CSV_HEADER: [&str; 8] = [
    "domain",
    "status_text",
    "status",
    "response_time_ms",
    "page_type",
    "title",
    "message",
    "screenshot",
];

/// Writes one record per result
pub struct CsvReport {
    path: PathBuf,
    only_alive: bool,
}

impl CsvReport {
    pub fn new(path: impl Into<PathBuf>, only_alive: bool) -> Self {
        Self {
            path: path.into(),
            only_alive,
        }
    }
}

impl ReportWriter for CsvReport {
    fn name(&self) -> &'static str {
        "csv"
    }

    fn write(&self, results: &[ProbeResult], _summary: &RunSummary) -> OutputResult<()> {
        let mut wtr = Writer::from_path(&self.path)?;

        wtr.write_record(CSV_HEADER)?;
        for result in selected(results, self.only_alive) {
            wtr.write_record(record(result))?;
        }
        wtr.flush()?;

        Ok(())
    }
}

/// Fields of one result, in [`CSV_HEADER`] order
pub fn record(result: &ProbeResult) -> [String; 8] {
    let screenshot = result
        .screenshot
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_default();

    [
        clean_field(&result.domain),
        clean_field(&result.status_text),
        result.status.to_string(),
        result.response_time.as_millis().to_string(),
        clean_field(result.page_type()),
        clean_field(result.title()),
        clean_field(&result.message),
        clean_field(&screenshot),
    ]
}

// Commas and line breaks inside values become spaces so every record stays
// on one line; quotes are left to the writer.
fn clean_field(value: &str) -> String {
    value
        .chars()
        .map(|c| match c {
            ',' | '\n' | '\r' => ' ',
            c => c,
        })
        .collect()
}
