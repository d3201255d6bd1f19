//! Pipeline runner
//!
//! load → partition → persist → schema → missing values → ranges → report.
//! Stages run strictly in sequence and the first I/O or parse failure aborts
//! the run before any report is rendered.

use crate::config::PipelineConfig;
use crate::partition::{partition, CleaningSummary};
use crate::quality::QualityReport;
use crate::report::{render, ReportFormat, Status};
use crate::sink::{CsvSink, PersistedFile, RecordSink, Target};
use crate::source::{CsvSource, RecordSource};
use orderqc_common::{QcError, Result};
use std::io::Write;
use tracing::{info, instrument, warn};

/// Everything a completed run produced
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub summary: CleaningSummary,
    pub report: QualityReport,
    /// Clean file first, then quarantine
    pub outputs: Vec<PersistedFile>,
}

impl RunOutcome {
    pub fn status(&self) -> Status {
        Status::of(&self.report)
    }
}

/// One configured run over a source and a sink
pub struct Pipeline<S, K> {
    config: PipelineConfig,
    source: S,
    sink: K,
}

impl Pipeline<CsvSource, CsvSink> {
    /// File-backed pipeline for `config`
    pub fn from_config(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        let delimiter = config.delimiter_byte()?;
        let source = CsvSource::new(&config.input_path, delimiter);
        let sink = CsvSink::new(config.clean_path(), config.quarantine_path(), delimiter);
        Ok(Self::new(config, source, sink))
    }
}

impl<S: RecordSource, K: RecordSink> Pipeline<S, K> {
    pub fn new(config: PipelineConfig, source: S, sink: K) -> Self {
        Self {
            config,
            source,
            sink,
        }
    }

    /// Execute every stage, writing progress markers and the report to `out`.
    #[instrument(skip_all, fields(input = %self.source.location()))]
    pub fn run(&self, out: &mut dyn Write) -> Result<RunOutcome> {
        self.progress(out, "Loading data...")?;
        let records = self.source.load()?;

        let split = partition(&records)?;
        let outputs = vec![
            self.sink.persist(Target::Clean, &split.clean)?,
            self.sink.persist(Target::Quarantine, &split.quarantine)?,
        ];
        let clean = split.clean;

        let report = QualityReport::evaluate(&clean, |marker| self.progress(out, marker))?;

        if self.config.report_format == ReportFormat::Text {
            writeln!(out).map_err(|e| QcError::io("<report output>", e))?;
        }
        render(&split.summary, &report, self.config.report_format, out)?;

        let outcome = RunOutcome {
            summary: split.summary,
            report,
            outputs,
        };
        match outcome.status() {
            Status::Passed => info!("Quality checks passed"),
            Status::Failed => warn!(
                schema_issues = outcome.report.schema_issues.len(),
                missing_values = outcome.report.missing_values.total(),
                range_issues = outcome.report.range_issues.len(),
                "Quality checks failed"
            ),
        }
        Ok(outcome)
    }

    /// Stage markers go to the log, and to `out` unless it carries JSON
    fn progress(&self, out: &mut dyn Write, marker: &str) -> Result<()> {
        info!("{}", marker);
        if self.config.report_format == ReportFormat::Text {
            writeln!(out, "{marker}").map_err(|e| QcError::io("<report output>", e))?;
        }
        Ok(())
    }
}
