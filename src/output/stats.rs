//! Run summary display

use crate::probe::RunSummary;
use std::fmt::Write as _;

/// Formats a run summary for the terminal
///
/// The page type section is only present when at least one page was
/// classified.
pub fn format_summary(summary: &RunSummary) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "=== Probe Summary ===\n");
    let _ = writeln!(out, "Overview:");
    let _ = writeln!(out, "  Total domains: {}", summary.total);
    let _ = writeln!(
        out,
        "  Alive: {} ({:.1}%)",
        summary.alive,
        summary.alive_percent()
    );
    let _ = writeln!(out, "  Dead: {}", summary.dead);
    let _ = writeln!(out, "  Screenshots: {}", summary.screenshots);
    let _ = writeln!(out, "  Elapsed: {:.2}s", summary.elapsed.as_secs_f64());

    if !summary.page_types.is_empty() {
        let _ = writeln!(out, "\nPage Types:");
        for (page_type, count) in summary.page_types_sorted() {
            let percentage = if summary.alive > 0 {
                count as f64 / summary.alive as f64 * 100.0
            } else {
                0.0
            };
            let _ = writeln!(out, "  {}: {} ({:.1}%)", page_type, count, percentage);
        }
    }

    out
}

/// Prints a run summary to stdout
pub fn print_summary(summary: &RunSummary) {
    print!("{}", format_summary(summary));
}
