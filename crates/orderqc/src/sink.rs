//! Record sinks
//!
//! Output files are written to a temporary file beside the destination and
//! renamed into place, so a failed write never leaves a truncated file.

use crate::record::{is_null_text, RecordSet};
use orderqc_common::{checksum, QcError, Result};
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

/// Which partition is being persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    Clean,
    Quarantine,
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Target::Clean => write!(f, "clean"),
            Target::Quarantine => write!(f, "quarantine"),
        }
    }
}

/// What a sink wrote for one target
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PersistedFile {
    pub target: Target,
    pub path: PathBuf,
    pub rows: usize,
    pub sha256: String,
}

/// Destination for the clean and quarantine sets
pub trait RecordSink {
    fn persist(&self, target: Target, records: &RecordSet) -> Result<PersistedFile>;
}

/// Writes each target to its own delimited file
#[derive(Debug, Clone)]
pub struct CsvSink {
    clean_path: PathBuf,
    quarantine_path: PathBuf,
    delimiter: u8,
}

impl CsvSink {
    pub fn new(clean_path: impl Into<PathBuf>, quarantine_path: impl Into<PathBuf>, delimiter: u8) -> Self {
        Self {
            clean_path: clean_path.into(),
            quarantine_path: quarantine_path.into(),
            delimiter,
        }
    }

    pub fn path_for(&self, target: Target) -> &Path {
        match target {
            Target::Clean => &self.clean_path,
            Target::Quarantine => &self.quarantine_path,
        }
    }
}

impl RecordSink for CsvSink {
    #[instrument(skip(self, records), fields(rows = records.len()))]
    fn persist(&self, target: Target, records: &RecordSet) -> Result<PersistedFile> {
        let path = self.path_for(target);
        write_atomically(path, |file| write_records(file, records, self.delimiter))?;

        let sha256 = checksum::sha256_file(path)?;
        info!(%target, path = %path.display(), %sha256, "Saved records");

        Ok(PersistedFile {
            target,
            path: path.to_path_buf(),
            rows: records.len(),
            sha256,
        })
    }
}

/// Write header and rows; null cells become empty fields.
pub fn write_records<W: Write>(writer: W, records: &RecordSet, delimiter: u8) -> std::io::Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(writer);

    writer.write_record(records.columns())?;
    for row in records.rows() {
        writer.write_record(
            row.cells()
                .iter()
                .map(|cell| if is_null_text(cell) { "" } else { cell.as_str() }),
        )?;
    }
    writer.flush()
}

fn write_atomically<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut std::fs::File) -> std::io::Result<()>,
{
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(|e| QcError::io(dir, e))?;

    let mut staged = staging_builder().tempfile_in(dir).map_err(|e| QcError::io(dir, e))?;
    write(staged.as_file_mut()).map_err(|e| QcError::io(path, e))?;
    staged
        .as_file()
        .sync_all()
        .map_err(|e| QcError::io(path, e))?;
    staged.persist(path).map_err(|e| QcError::io(path, e.error))?;
    Ok(())
}

/// Staged files get the same mode a plain create would (0666 less umask),
/// not tempfile's owner-only default.
#[cfg(unix)]
fn staging_builder() -> tempfile::Builder<'static, 'static> {
    use std::os::unix::fs::PermissionsExt;

    let mut builder = tempfile::Builder::new();
    builder.permissions(std::fs::Permissions::from_mode(0o666));
    builder
}

#[cfg(not(unix))]
fn staging_builder() -> tempfile::Builder<'static, 'static> {
    tempfile::Builder::new()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::record::Row;
    use tempfile::TempDir;

    fn sample() -> RecordSet {
        RecordSet::new(
            vec!["order_id".into(), "product_category".into(), "note".into()],
            vec![
                Row::new(2, vec!["1".into(), "NA".into(), "a, b".into()]),
                Row::new(3, vec!["2".into(), "toys".into(), String::new()]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_write_records_blanks_nulls_and_quotes() {
        let mut out = Vec::new();
        write_records(&mut out, &sample(), b',').unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "order_id,product_category,note\n1,,\"a, b\"\n2,toys,\n"
        );
    }

    #[test]
    fn test_header_only_when_empty() {
        let mut out = Vec::new();
        write_records(&mut out, &sample().empty_like(), b',').unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "order_id,product_category,note\n");
    }

    #[test]
    fn test_persist_creates_directories() {
        let dir = TempDir::new().unwrap();
        let clean = dir.path().join("processed/nested/clean.csv");
        let quarantine = dir.path().join("processed/nested/quarantine.csv");
        let sink = CsvSink::new(&clean, &quarantine, b',');

        let written = sink.persist(Target::Quarantine, &sample()).unwrap();

        assert_eq!(written.path, quarantine);
        assert_eq!(written.rows, 2);
        assert_eq!(written.sha256, checksum::sha256_file(&quarantine).unwrap());
        assert!(!clean.exists());
    }

    #[test]
    fn test_persist_overwrites_previous_output() {
        let dir = TempDir::new().unwrap();
        let clean = dir.path().join("clean.csv");
        std::fs::write(&clean, "stale contents\n").unwrap();
        let sink = CsvSink::new(&clean, dir.path().join("q.csv"), b',');

        sink.persist(Target::Clean, &sample()).unwrap();

        let text = std::fs::read_to_string(&clean).unwrap();
        assert!(text.starts_with("order_id,product_category,note\n"));
        // no staging files left behind
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_unwritable_destination_is_an_io_error() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, "").unwrap();
        let sink = CsvSink::new(blocker.join("clean.csv"), blocker.join("q.csv"), b',');

        let err = sink.persist(Target::Clean, &sample()).unwrap_err();
        assert!(err.is_io());
    }

    #[cfg(unix)]
    #[test]
    fn test_persisted_file_mode_matches_plain_create() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let clean = dir.path().join("clean.csv");
        let sink = CsvSink::new(&clean, dir.path().join("q.csv"), b',');
        sink.persist(Target::Clean, &sample()).unwrap();

        let plain = dir.path().join("plain.csv");
        std::fs::write(&plain, "order_id\n").unwrap();

        let mode = |path: &Path| std::fs::metadata(path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode(&clean), mode(&plain));
    }
}
