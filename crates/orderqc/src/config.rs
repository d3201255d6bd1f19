//! Run configuration
//!
//! Every path the pipeline touches comes from a [`PipelineConfig`] handed to
//! the runner. Precedence: command-line flags, then environment, then the
//! defaults below.

use crate::report::ReportFormat;
use orderqc_common::{QcError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_INPUT_PATH: &str = "data/orders_raw.csv";
pub const DEFAULT_OUTPUT_DIR: &str = "data/processed";
pub const DEFAULT_CLEAN_FILE: &str = "orders_clean.csv";
pub const DEFAULT_QUARANTINE_FILE: &str = "orders_quarantine.csv";

/// Environment variable overriding the input file
pub const ENV_INPUT: &str = "ORDERQC_INPUT";
/// Environment variable overriding the output directory
pub const ENV_OUTPUT_DIR: &str = "ORDERQC_OUTPUT_DIR";

/// Configuration for one pipeline run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Raw orders file
    pub input_path: PathBuf,

    /// Directory receiving the clean and quarantine files
    pub output_dir: PathBuf,

    pub clean_file_name: String,

    pub quarantine_file_name: String,

    /// Field delimiter for input and output files
    pub delimiter: char,

    #[serde(default)]
    pub report_format: ReportFormat,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from(DEFAULT_INPUT_PATH),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            clean_file_name: DEFAULT_CLEAN_FILE.to_string(),
            quarantine_file_name: DEFAULT_QUARANTINE_FILE.to_string(),
            delimiter: ',',
            report_format: ReportFormat::Text,
        }
    }
}

impl PipelineConfig {
    /// Defaults with environment overrides applied
    pub fn from_env() -> Self {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(input) = lookup(ENV_INPUT) {
            self.input_path = PathBuf::from(input);
        }
        if let Some(dir) = lookup(ENV_OUTPUT_DIR) {
            self.output_dir = PathBuf::from(dir);
        }
        self
    }

    /// Full path of the clean output file
    pub fn clean_path(&self) -> PathBuf {
        self.output_dir.join(&self.clean_file_name)
    }

    /// Full path of the quarantine output file
    pub fn quarantine_path(&self) -> PathBuf {
        self.output_dir.join(&self.quarantine_file_name)
    }

    /// Delimiter as the single byte the CSV layer expects
    pub fn delimiter_byte(&self) -> Result<u8> {
        u8::try_from(self.delimiter)
            .ok()
            .filter(|b| b.is_ascii() && *b != b'"' && *b != b'\n' && *b != b'\r')
            .ok_or_else(|| {
                QcError::config(format!("Unsupported delimiter {:?}", self.delimiter))
            })
    }

    /// Reject configurations that cannot produce a run
    pub fn validate(&self) -> Result<()> {
        self.delimiter_byte()?;

        for (what, name) in [
            ("clean", &self.clean_file_name),
            ("quarantine", &self.quarantine_file_name),
        ] {
            if name.trim().is_empty() {
                return Err(QcError::config(format!("{what} file name is empty")));
            }
        }

        if self.clean_path() == self.quarantine_path() {
            return Err(QcError::config(
                "clean and quarantine outputs point to the same file",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_paths() {
        let config = PipelineConfig::default();
        assert_eq!(config.input_path, PathBuf::from("data/orders_raw.csv"));
        assert_eq!(config.clean_path(), PathBuf::from("data/processed/orders_clean.csv"));
        assert_eq!(
            config.quarantine_path(),
            PathBuf::from("data/processed/orders_quarantine.csv")
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_overrides() {
        let env = HashMap::from([(ENV_OUTPUT_DIR, "/tmp/orderqc-out")]);
        let config =
            PipelineConfig::default().with_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.input_path, PathBuf::from(DEFAULT_INPUT_PATH));
        assert_eq!(config.clean_path(), PathBuf::from("/tmp/orderqc-out/orders_clean.csv"));
    }

    #[test]
    fn test_delimiter_validation() {
        let mut config = PipelineConfig::default();
        config.delimiter = ';';
        assert_eq!(config.delimiter_byte().unwrap(), b';');

        config.delimiter = 'é';
        assert!(matches!(config.validate(), Err(QcError::Config(_))));

        config.delimiter = '"';
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_output_names_must_differ_and_be_present() {
        let mut config = PipelineConfig::default();
        config.quarantine_file_name = config.clean_file_name.clone();
        assert!(config.validate().is_err());

        config.quarantine_file_name = "  ".into();
        assert!(config.validate().is_err());
    }
}
