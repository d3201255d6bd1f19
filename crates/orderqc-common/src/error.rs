//! Error types for orderqc
//!
//! Only failures that abort a run live here. Data-quality findings (schema
//! gaps, missing values, range violations) are reported, never raised.

use std::path::Path;
use thiserror::Error;

/// Result type alias for orderqc operations
pub type Result<T> = std::result::Result<T, QcError>;

/// Fatal error raised by a pipeline stage
#[derive(Error, Debug)]
pub enum QcError {
    /// A source could not be read or a sink could not be written
    #[error("IO error on '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Input is not valid tabular data
    #[error("Parse error: {0}")]
    Parse(String),

    /// Run configuration is unusable
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl QcError {
    /// Create an IO error tied to the path that failed
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().display().to_string(),
            source,
        }
    }

    /// Create a parse error
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether the error came from the filesystem rather than the data
    pub fn is_io(&self) -> bool {
        matches!(self, Self::Io { .. })
    }
}
