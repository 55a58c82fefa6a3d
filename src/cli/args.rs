//! CLI argument definitions using clap
//!
//! Commands:
//! - draughts cast --model <name> [--input <file>]
//! - draughts fields --model <name> [--flat]
//! - draughts models

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::observability::Severity;

/// draughts - typed views over JSON documents
#[derive(Parser, Debug)]
#[command(name = "draughts")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, global = true, default_value = "./draughts.json")]
    pub config: PathBuf,

    /// Directory of model declarations (overrides the config file)
    #[arg(long, global = true)]
    pub models_dir: Option<PathBuf>,

    /// Minimum log severity written to stderr (overrides the config file)
    #[arg(long, global = true)]
    pub log_level: Option<Severity>,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub pretty: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Cast a JSON document through a model and print the canonical form
    Cast {
        /// Model name
        #[arg(long)]
        model: String,

        /// Input file; reads stdin when absent
        #[arg(long)]
        input: Option<PathBuf>,
    },

    /// Print a model's field registry
    Fields {
        /// Model name
        #[arg(long)]
        model: String,

        /// Print the flattened registry of dotted paths
        #[arg(long)]
        flat: bool,
    },

    /// List loaded model names
    Models,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
