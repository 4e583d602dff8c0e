//! Source Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A source error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for repository operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Sources directory does not exist
    #[display("sources directory not found: {}", _0.display())]
    NotFound(#[error(not(source))] PathBuf),
    /// No source with this identifier has been imported
    #[display("source not found: {_0}")]
    SourceNotFound(#[error(not(source))] String),
    /// The source has no content record with this ID
    #[display("content record {_1} not found in source {_0}")]
    RecordNotFound(#[error(not(source))] String, #[error(not(source))] u64),
    /// Reading or writing a source file failed
    #[display("I/O error: {}", _0.display())]
    Io(#[error(not(source))] PathBuf),
    /// A source file is not a valid export
    #[display("invalid source data: {}", _0.display())]
    InvalidData(#[error(not(source))] PathBuf),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Io(_))
    }
}
