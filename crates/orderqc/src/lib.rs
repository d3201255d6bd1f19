//! orderqc Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Batch quality gate for order exports.
//!
//! # Overview
//!
//! A run reads a delimited orders file, splits it into clean and quarantined
//! rows, writes both sets next to each other, and reports on the clean set:
//!
//! - **Source**: delimited file into an in-memory [`RecordSet`]
//! - **Partition**: four validity conditions route rows to quarantine
//! - **Sink**: atomic per-file writes of both partitions
//! - **Quality**: schema, missing-value and numeric-range checks
//! - **Report**: text or JSON rendering with a PASSED/FAILED verdict
//!
//! # Example
//!
//! ```no_run
//! use orderqc::{Pipeline, PipelineConfig};
//!
//! fn main() -> orderqc::Result<()> {
//!     let pipeline = Pipeline::from_config(PipelineConfig::from_env())?;
//!     let outcome = pipeline.run(&mut std::io::stdout())?;
//!     println!("{}", outcome.status());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod partition;
pub mod pipeline;
pub mod quality;
pub mod record;
pub mod report;
pub mod sink;
pub mod source;

// Re-export commonly used types
pub use config::PipelineConfig;
pub use orderqc_common::{QcError, Result};
pub use pipeline::{Pipeline, RunOutcome};
pub use record::RecordSet;
pub use report::{ReportFormat, Status};

use clap::Parser;
use std::path::PathBuf;

/// Exit code of a completed run whose verdict is FAILED under `--strict`
pub const EXIT_QUALITY_FAILED: i32 = 3;

/// orderqc - split an orders file into clean and quarantined rows and report on quality
#[derive(Parser, Debug)]
#[command(name = "orderqc")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Raw orders file [env: ORDERQC_INPUT] [default: data/orders_raw.csv]
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Directory for the clean and quarantine files [env: ORDERQC_OUTPUT_DIR] [default: data/processed]
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// File name of the clean output
    #[arg(long, default_value = config::DEFAULT_CLEAN_FILE)]
    pub clean_file: String,

    /// File name of the quarantine output
    #[arg(long, default_value = config::DEFAULT_QUARANTINE_FILE)]
    pub quarantine_file: String,

    /// Field delimiter of input and output files
    #[arg(short, long, default_value_t = ',')]
    pub delimiter: char,

    /// Report format written to stdout
    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    pub report_format: ReportFormat,

    /// Exit with a non-zero code when the quality verdict is FAILED
    #[arg(long)]
    pub strict: bool,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Print the CLI reference as markdown and exit
    #[arg(long, hide = true)]
    pub markdown_help: bool,
}

impl Cli {
    /// Resolve the run configuration: flags over environment over defaults
    pub fn pipeline_config(&self) -> PipelineConfig {
        let mut config = PipelineConfig::from_env();
        if let Some(ref input) = self.input {
            config.input_path = input.clone();
        }
        if let Some(ref dir) = self.output_dir {
            config.output_dir = dir.clone();
        }
        config.clean_file_name = self.clean_file.clone();
        config.quarantine_file_name = self.quarantine_file.clone();
        config.delimiter = self.delimiter;
        config.report_format = self.report_format;
        config
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_flags_override_defaults() {
        let cli = Cli::parse_from([
            "orderqc",
            "--input",
            "in/orders.tsv",
            "--output-dir",
            "out",
            "--delimiter",
            "\t",
            "--report-format",
            "json",
        ]);
        let config = cli.pipeline_config();

        assert_eq!(config.input_path, PathBuf::from("in/orders.tsv"));
        assert_eq!(config.clean_path(), PathBuf::from("out/orders_clean.csv"));
        assert_eq!(config.delimiter, '\t');
        assert_eq!(config.report_format, ReportFormat::Json);
    }
}
