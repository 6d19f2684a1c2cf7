//! Root CLI structure with global options.

use clap::Parser;

use crate::commands::Commands;

/// Prepare Wine environments for Windows programs.
#[derive(Parser)]
#[command(name = "bottler")]
#[command(about = "Provision Bottles environments and serve the tool-call gateway")]
#[command(version)]
pub struct Cli {
    /// Override the directory holding all environments
    #[arg(long = "prefix-base", global = true)]
    pub prefix_base: Option<String>,

    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}
