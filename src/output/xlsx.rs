//! Spreadsheet report
//!
//! One "Results" sheet with a row per domain and, when any screenshot was
//! captured, a "Screenshots" sheet with the images inlined next to their
//! domain.

use crate::output::traits::{selected, OutputResult, ReportWriter};
use crate::probe::{ProbeResult, RunSummary};
use rust_xlsxwriter::{Color, Format, FormatBorder, Image, Workbook, Worksheet};
use std::path::PathBuf;

const HEADERS: [(&str, u16); 8] = [
    ("Domain", 40),
    ("Status", 20),
    ("Status Code", 12),
    ("Response Time (ms)", 18),
    ("Page Type", 20),
    ("Title", 40),
    ("Message", 30),
    ("Screenshot", 40),
];

const SCREENSHOT_ROW_HEIGHT: f64 = 300.0;
const SCREENSHOT_SCALE: f64 = 0.3;

pub struct XlsxReport {
    path: PathBuf,
    only_alive: bool,
}

impl XlsxReport {
    pub fn new(path: impl Into<PathBuf>, only_alive: bool) -> Self {
        Self {
            path: path.into(),
            only_alive,
        }
    }
}

impl ReportWriter for XlsxReport {
    fn name(&self) -> &'static str {
        "xlsx"
    }

    fn write(&self, results: &[ProbeResult], _summary: &RunSummary) -> OutputResult<()> {
        let rows: Vec<&ProbeResult> = selected(results, self.only_alive).collect();

        let mut workbook = Workbook::new();
        workbook.push_worksheet(results_sheet(&rows)?);

        let captured: Vec<&ProbeResult> = rows
            .iter()
            .copied()
            .filter(|r| r.screenshot.is_some())
            .collect();
        if !captured.is_empty() {
            workbook.push_worksheet(screenshot_sheet(&captured)?);
        }

        workbook.save(&self.path)?;
        Ok(())
    }
}

fn header_format() -> Format {
    Format::new()
        .set_bold()
        .set_background_color(Color::RGB(0xD9E1F2))
        .set_border(FormatBorder::Thin)
}

fn results_sheet(rows: &[&ProbeResult]) -> OutputResult<Worksheet> {
    let mut sheet = Worksheet::new();
    sheet.set_name("Results")?;

    let header = header_format();
    let cell = Format::new().set_border(FormatBorder::Thin);
    let alive = cell.clone().set_font_color(Color::Green);
    let dead = cell.clone().set_font_color(Color::Red);

    for (col, (title, width)) in (0u16..).zip(HEADERS) {
        sheet.write_with_format(0, col, title, &header)?;
        sheet.set_column_width(col, width)?;
    }
    sheet.set_freeze_panes(1, 0)?;

    for (row, result) in (1u32..).zip(rows.iter()) {
        let status_format = if result.alive { &alive } else { &dead };
        let screenshot = result
            .screenshot
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_default();

        sheet.write_with_format(row, 0, result.domain.as_str(), &cell)?;
        sheet.write_with_format(row, 1, result.status_text.as_str(), status_format)?;
        sheet.write_with_format(row, 2, f64::from(result.status), &cell)?;
        sheet.write_with_format(row, 3, result.response_time.as_millis() as f64, &cell)?;
        sheet.write_with_format(row, 4, result.page_type(), &cell)?;
        sheet.write_with_format(row, 5, result.title(), &cell)?;
        sheet.write_with_format(row, 6, result.message.as_str(), &cell)?;
        sheet.write_with_format(row, 7, screenshot.as_str(), &cell)?;
    }

    Ok(sheet)
}

fn screenshot_sheet(rows: &[&ProbeResult]) -> OutputResult<Worksheet> {
    let mut sheet = Worksheet::new();
    sheet.set_name("Screenshots")?;

    let header = header_format();
    sheet.write_with_format(0, 0, "Domain", &header)?;
    sheet.write_with_format(0, 1, "Screenshot", &header)?;
    sheet.set_column_width(0, 40)?;
    sheet.set_column_width(1, 200)?;
    sheet.set_freeze_panes(1, 0)?;

    for (row, result) in (1u32..).zip(rows.iter()) {
        sheet.write(row, 0, result.domain.as_str())?;

        let Some(path) = &result.screenshot else {
            continue;
        };
        match Image::new(path) {
            Ok(mut image) => {
                let image = image
                    .set_scale_width(SCREENSHOT_SCALE)
                    .set_scale_height(SCREENSHOT_SCALE);
                sheet.set_row_height(row, SCREENSHOT_ROW_HEIGHT)?;
                sheet.insert_image(row, 1, &image)?;
            }
            Err(e) => {
                tracing::warn!("Cannot embed screenshot {}: {}", path.display(), e);
                sheet.write(row, 1, "image unavailable")?;
            }
        }
    }

    Ok(sheet)
}
