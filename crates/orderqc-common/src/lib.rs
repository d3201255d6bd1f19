//! orderqc Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared error handling, logging and checksum utilities for the orderqc
//! workspace.
//!
//! # Overview
//!
//! - **Error Handling**: the fatal error taxonomy of a pipeline run
//! - **Logging**: tracing subscriber setup shared by every binary
//! - **Checksums**: SHA-256 digests of written output files
//!
//! # Example
//!
//! ```no_run
//! use orderqc_common::{checksum, Result};
//!
//! fn fingerprint(path: &str) -> Result<()> {
//!     let digest = checksum::sha256_file(path)?;
//!     println!("{path}: {digest}");
//!     Ok(())
//! }
//! ```

pub mod checksum;
pub mod error;
pub mod logging;

// Re-export commonly used types
pub use error::{QcError, Result};
