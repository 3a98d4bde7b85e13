//! Output module for run summaries and reports
//!
//! This module handles:
//! - Printing the run summary to the terminal
//! - Writing CSV, HTML, spreadsheet and SQLite reports of the results

mod csv_output;
mod html;
mod sqlite_output;
pub mod stats;
mod traits;
mod xlsx;

pub use csv_output::{CsvReport, CSV_HEADER};
pub use html::HtmlReport;
pub use sqlite_output::{initialize_schema, record_run, SqliteReport};
pub use stats::{format_summary, print_summary};
pub use traits::{OutputError, OutputResult, ReportWriter};
pub use xlsx::XlsxReport;

use crate::config::OutputConfig;
use crate::probe::RunReport;

/// Builds the writers requested by the output configuration
pub fn report_writers(config: &OutputConfig, config_hash: &str) -> Vec<Box<dyn ReportWriter>> {
    let mut writers: Vec<Box<dyn ReportWriter>> = Vec::new();

    if let Some(path) = &config.csv_path {
        writers.push(Box::new(CsvReport::new(path, config.only_alive)));
    }
    if let Some(path) = &config.html_path {
        writers.push(Box::new(HtmlReport::new(path, config.only_alive)));
    }
    if let Some(path) = &config.xlsx_path {
        writers.push(Box::new(XlsxReport::new(path, config.only_alive)));
    }
    if let Some(path) = &config.database_path {
        writers.push(Box::new(SqliteReport::new(
            path,
            config.only_alive,
            config_hash,
        )));
    }

    writers
}

/// Writes every configured report
///
/// Stops at the first writer that fails.
pub fn write_reports(
    config: &OutputConfig,
    report: &RunReport,
    config_hash: &str,
) -> crate::Result<()> {
    for writer in report_writers(config, config_hash) {
        writer.write(&report.results, &report.summary)?;
        tracing::info!("Wrote {} report", writer.name());
    }

    Ok(())
}
