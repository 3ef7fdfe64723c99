//! Command definitions.

use clap::{Parser, Subcommand};
use clap_complete::Shell;

pub mod completions;
pub mod push;

pub use push::PushArgs;

/// Push local files into a GitHub repository through the git-data API.
#[derive(Debug, Parser)]
#[command(name = "treepush", version, about, long_about = None)]
pub struct Cli {
    /// Only print errors and essential output.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Commit files to a branch without cloning.
    Push(PushArgs),

    /// Generate shell completions.
    Completions {
        /// Target shell.
        shell: Shell,
    },
}
