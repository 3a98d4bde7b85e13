//! Self-contained HTML report
//!
//! Screenshots are embedded as base64 `data:` URIs so the report is a single
//! file that can be moved or mailed on its own.

use crate::output::traits::{selected, OutputResult, ReportWriter};
use crate::probe::{ProbeResult, RunSummary};
use base64::{engine::general_purpose, Engine as _};
use chrono::Local;
use html_escape::{encode_double_quoted_attribute, encode_text};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

const UTF8_BOM: &str = "\u{feff}";

const STYLE: &str = r#"
body { font-family: sans-serif; margin: 2em; color: #222; }
table { border-collapse: collapse; width: 100%; }
th, td { border: 1px solid #ccc; padding: 4px 8px; text-align: left; vertical-align: top; }
th { background: #f0f0f0; }
tr.alive td.status { color: #1a7f37; font-weight: bold; }
tr.dead td.status { color: #b42318; }
td img { max-width: 320px; }
.summary span { margin-right: 2em; }
"#;

pub struct HtmlReport {
    path: PathBuf,
    only_alive: bool,
}

impl HtmlReport {
    pub fn new(path: impl Into<PathBuf>, only_alive: bool) -> Self {
        Self {
            path: path.into(),
            only_alive,
        }
    }
}

impl ReportWriter for HtmlReport {
    fn name(&self) -> &'static str {
        "html"
    }

    fn write(&self, results: &[ProbeResult], summary: &RunSummary) -> OutputResult<()> {
        let html = render_report(selected(results, self.only_alive), summary);
        std::fs::write(&self.path, html)?;
        Ok(())
    }
}

/// Renders the full document, BOM included
pub fn render_report<'a>(
    results: impl Iterator<Item = &'a ProbeResult>,
    summary: &RunSummary,
) -> String {
    let mut html = String::from(UTF8_BOM);

    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str("<title>Subprobe Report</title>\n");
    let _ = writeln!(html, "<style>{}</style>", STYLE);
    html.push_str("</head>\n<body>\n<h1>Subprobe Report</h1>\n");

    let _ = writeln!(
        html,
        "<p class=\"summary\"><span>Generated: {}</span><span>Total: {}</span><span>Alive: {}</span><span>Dead: {}</span><span>Screenshots: {}</span><span>Elapsed: {:.2}s</span></p>",
        Local::now().format("%Y-%m-%d %H:%M:%S"),
        summary.total,
        summary.alive,
        summary.dead,
        summary.screenshots,
        summary.elapsed.as_secs_f64()
    );

    if !summary.page_types.is_empty() {
        html.push_str("<h2>Page Types</h2>\n<ul>\n");
        for (page_type, count) in summary.page_types_sorted() {
            let _ = writeln!(html, "<li>{}: {}</li>", encode_text(page_type), count);
        }
        html.push_str("</ul>\n");
    }

    html.push_str("<table>\n<tr><th>Domain</th><th>Status</th><th>Response Time</th><th>Page Type</th><th>Title</th><th>Message</th><th>Screenshot</th></tr>\n");
    for result in results {
        render_row(&mut html, result);
    }
    html.push_str("</table>\n</body>\n</html>\n");

    html
}

fn render_row(html: &mut String, result: &ProbeResult) {
    let class = if result.alive { "alive" } else { "dead" };
    let screenshot = result
        .screenshot
        .as_deref()
        .and_then(embed_image)
        .map(|uri| format!("<img src=\"{}\" alt=\"\">", encode_double_quoted_attribute(&uri)))
        .unwrap_or_default();

    let _ = writeln!(
        html,
        "<tr class=\"{}\"><td><a href=\"{}\">{}</a></td><td class=\"status\">{}</td><td>{} ms</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
        class,
        encode_double_quoted_attribute(&link_for(&result.domain)),
        encode_text(&result.domain),
        encode_text(&result.status_text),
        result.response_time.as_millis(),
        encode_text(result.page_type()),
        encode_text(result.title()),
        encode_text(&result.message),
        screenshot
    );
}

/// Link target for a domain; schemeless inputs get `http://`
fn link_for(domain: &str) -> String {
    let domain = domain.trim();
    if domain.contains("://") {
        domain.to_string()
    } else {
        format!("http://{}", domain)
    }
}

/// Reads an image into a `data:` URI; unreadable files are skipped
fn embed_image(path: &Path) -> Option<String> {
    match std::fs::read(path) {
        Ok(bytes) => Some(format!(
            "data:{};base64,{}",
            mime_for(path),
            general_purpose::STANDARD.encode(bytes)
        )),
        Err(e) => {
            tracing::warn!("Skipping screenshot {}: {}", path.display(), e);
            None
        }
    }
}

fn mime_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "image/jpeg",
    }
}
