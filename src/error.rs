//! CLI Error Types

use derive_more::{Display, Error};

/// A command error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for commands.
pub type Result<T> = std::result::Result<T, Error>;

/// Which stage of a command failed.
#[derive(Debug, Display, Error, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    #[display("could not load configuration")]
    Config,
    #[display("could not read or save imported records")]
    Source,
    #[display("could not produce the failure report")]
    Report,
    #[display("could not install the log subscriber")]
    Logging,
}
