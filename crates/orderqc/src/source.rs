//! Record sources
//!
//! A source turns a location into a [`RecordSet`]. No schema validation
//! happens here; missing columns surface later in the quality checks.

use crate::record::{RecordSet, Row};
use orderqc_common::{QcError, Result};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

/// Anything that can produce the raw record set for a run
pub trait RecordSource {
    /// Human-readable location, used in logs
    fn location(&self) -> String;

    /// Read the full record set
    fn load(&self) -> Result<RecordSet>;
}

/// Delimited text file with a header row
#[derive(Debug, Clone)]
pub struct CsvSource {
    path: PathBuf,
    delimiter: u8,
}

impl CsvSource {
    pub fn new(path: impl Into<PathBuf>, delimiter: u8) -> Self {
        Self {
            path: path.into(),
            delimiter,
        }
    }
}

impl RecordSource for CsvSource {
    fn location(&self) -> String {
        self.path.display().to_string()
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    fn load(&self) -> Result<RecordSet> {
        let file = std::fs::File::open(&self.path).map_err(|e| QcError::io(&self.path, e))?;
        let records = read_records(file, self.delimiter, &self.path)?;

        info!(
            rows = records.len(),
            columns = records.columns().len(),
            "Loaded records"
        );
        Ok(records)
    }
}

/// Parse delimited text from any reader. `origin` names the input in errors.
pub fn read_records<R: Read>(mut reader: R, delimiter: u8, origin: &Path) -> Result<RecordSet> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes).map_err(|e| QcError::io(origin, e))?;

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes.as_slice());

    let header = reader.headers().map_err(|e| csv_error(origin, e))?.clone();
    if header.is_empty() {
        return Err(QcError::parse(format!(
            "{}: no columns to parse from input",
            origin.display()
        )));
    }
    let columns = disambiguate(header.iter());
    debug!(?columns, "Parsed header");

    let mut lines = LineIndex::new(&bytes);
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| csv_error(origin, e))?;
        let line = lines.line_at(record.position().map(|p| p.byte()).unwrap_or_default());
        rows.push(Row::new(line, record.iter().map(str::to_string).collect()));
    }

    RecordSet::new(columns, rows)
}

/// Physical line numbers for record start offsets, blank lines included.
/// Offsets must be queried in ascending order.
struct LineIndex<'a> {
    bytes: &'a [u8],
    offset: usize,
    line: u64,
}

impl<'a> LineIndex<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self {
            bytes,
            offset: 0,
            line: 1,
        }
    }

    fn line_at(&mut self, byte: u64) -> u64 {
        let mut start = usize::try_from(byte)
            .unwrap_or(self.bytes.len())
            .min(self.bytes.len());
        // blank lines ahead of a record fall inside its span
        while matches!(self.bytes.get(start), Some(b'\n' | b'\r')) {
            start += 1;
        }
        if start > self.offset {
            let newlines = self.bytes[self.offset..start]
                .iter()
                .filter(|&&b| b == b'\n')
                .count();
            self.line += newlines as u64;
            self.offset = start;
        }
        self.line
    }
}

/// Repeated header names become `name.1`, `name.2`, ...
fn disambiguate<'a>(names: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut columns: Vec<String> = Vec::new();
    for name in names {
        let mut candidate = name.to_string();
        let mut suffix = 0;
        while columns.contains(&candidate) {
            suffix += 1;
            candidate = format!("{name}.{suffix}");
        }
        columns.push(candidate);
    }
    columns
}

fn csv_error(origin: &Path, err: csv::Error) -> QcError {
    let message = err.to_string();
    match err.into_kind() {
        csv::ErrorKind::Io(source) => QcError::io(origin, source),
        _ => QcError::parse(format!("{}: {}", origin.display(), message)),
    }
}
