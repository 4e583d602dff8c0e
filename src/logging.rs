//! Log subscriber setup.

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// WARN by default; each `-v` raises it one step, `-q` lowers it to ERROR.
pub fn level(verbose: u8, quiet: bool) -> Level {
    match (quiet, verbose) {
        (true, _) => Level::ERROR,
        (false, 0) => Level::WARN,
        (false, 1) => Level::INFO,
        (false, 2) => Level::DEBUG,
        (false, _) => Level::TRACE,
    }
}

/// Installs the global subscriber. Logs go to stderr so stdout stays usable.
pub fn init(verbose: u8, quiet: bool) -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level(verbose, quiet))
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).or_raise(|| ErrorKind::Logging)
}
