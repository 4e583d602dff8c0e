use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

/// Rewrite links in content imported from a crawled site.
#[derive(Debug, Parser)]
#[command(name = "relink", version, about)]
pub struct Cli {
    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
    /// Config file, merged over the user config
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Rewrite the links in every record of a source
    Rewrite(RewriteArgs),
    /// List each record's links and how they would resolve, without saving
    Inspect {
        /// Source identifier
        source: Option<String>,
    },
    /// Summarize an existing failure log
    Report {
        file: PathBuf,
    },
}

#[derive(Debug, Args)]
pub struct RewriteArgs {
    /// Source identifier
    pub source: Option<String>,
    /// Print the lookup tables and stop
    #[arg(long)]
    pub dry_run: bool,
    /// Publish modified records, not just save them
    #[arg(long)]
    pub publish: bool,
    /// Where to write the failure log (overrides `failure_log`)
    #[arg(long, value_name = "FILE")]
    pub failure_log: Option<PathBuf>,
}
