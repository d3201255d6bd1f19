//! Report rendering
//!
//! Pure formatting of a finished run. Section order is fixed: cleaning
//! summary, schema status, missing-value census, range issues, verdict.

use crate::partition::CleaningSummary;
use crate::quality::QualityReport;
use orderqc_common::{QcError, Result};
use serde::{Deserialize, Serialize};
use std::io::Write;

/// Output format of the rendered report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// Human-readable text
    #[default]
    Text,
    /// A single JSON document
    Json,
}

/// Final verdict of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    Passed,
    Failed,
}

impl Status {
    pub fn of(report: &QualityReport) -> Self {
        if report.passed() {
            Status::Passed
        } else {
            Status::Failed
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Status::Passed => write!(f, "PASSED"),
            Status::Failed => write!(f, "FAILED"),
        }
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    summary: &'a CleaningSummary,
    #[serde(flatten)]
    checks: &'a QualityReport,
    status: Status,
}

/// Render `report` to `out` in the requested format.
pub fn render(
    summary: &CleaningSummary,
    report: &QualityReport,
    format: ReportFormat,
    out: &mut dyn Write,
) -> Result<()> {
    match format {
        ReportFormat::Text => render_text(summary, report, out).map_err(stream_error),
        ReportFormat::Json => {
            let document = JsonReport {
                summary,
                checks: report,
                status: Status::of(report),
            };
            serde_json::to_writer_pretty(&mut *out, &document)?;
            writeln!(out).map_err(stream_error)
        },
    }
}

fn stream_error(err: std::io::Error) -> QcError {
    QcError::io("<report output>", err)
}

fn render_text(
    summary: &CleaningSummary,
    report: &QualityReport,
    out: &mut dyn Write,
) -> std::io::Result<()> {
    writeln!(out, "--- CLEANING SUMMARY ---")?;
    writeln!(out, "Rows before processing: {}", summary.initial_rows)?;
    writeln!(out, "Clean rows saved:       {}", summary.clean_rows)?;
    writeln!(out, "Quarantined rows saved: {}", summary.quarantined_rows)?;

    writeln!(out)?;
    writeln!(out, "--- DATA QUALITY REPORT (CLEAN DATA) ---")?;
    if report.schema_issues.is_empty() {
        writeln!(out, "Schema Check: PASSED")?;
    } else {
        writeln!(out, "Schema Issues: {}", report.schema_issues.join(", "))?;
    }

    writeln!(out)?;
    writeln!(out, "Missing Values by Column:")?;
    let census = report.missing_values.columns();
    let name_width = census.iter().map(|c| c.column.chars().count()).max().unwrap_or(0);
    let count_width = census
        .iter()
        .map(|c| c.missing.to_string().len())
        .max()
        .unwrap_or(0);
    for entry in census {
        writeln!(
            out,
            "{:<name_width$}    {:>count_width$}",
            entry.column, entry.missing
        )?;
    }

    writeln!(out)?;
    if report.range_issues.is_empty() {
        writeln!(out, "Range Checks: PASSED")?;
    } else {
        writeln!(out, "Range Issues:")?;
        for issue in &report.range_issues {
            writeln!(out, "- {issue}")?;
        }
    }

    writeln!(out)?;
    writeln!(out, "FINAL STATUS: {}", Status::of(report))
}
