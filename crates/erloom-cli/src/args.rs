//! Command-line argument definitions for the Erloom CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments control the schema and output paths, the
//! configuration file, merging with the existing diagram, and logging
//! verbosity.

use clap::Parser;

/// Command-line arguments for the Erloom diagram tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input schema file (TOML)
    #[arg(help = "Path to the schema file")]
    pub input: String,

    /// Path to the output draw.io file, also read back to keep manual edits
    #[arg(short, long, default_value = "out.drawio")]
    pub output: String,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Ignore the existing output file and write a fresh layout
    #[arg(long)]
    pub no_merge: bool,
}
