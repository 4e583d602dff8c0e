//! Engine Error Types
//!
//! Resolution itself never fails (every outcome is a [`Resolution`](crate::Resolution)),
//! so these errors only surface while configuring the engine or from a
//! [`UrlProcessor`](crate::UrlProcessor), whose errors the engine swallows.

use derive_more::{Display, Error};

/// An engine error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The ignore marker is not a valid regular expression.
    #[display("invalid ignore marker pattern: {_0}")]
    InvalidPattern(#[error(not(source))] String),
    /// A URL processor could not make sense of its input.
    #[display("invalid URL: {_0}")]
    InvalidUrl(#[error(not(source))] String),
    /// A failure log line is not in the format the engine writes.
    #[display("unrecognised failure log line: {_0}")]
    InvalidFailureLine(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        // Same input, same answer.
        false
    }
}
