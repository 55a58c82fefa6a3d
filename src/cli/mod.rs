//! CLI module for draughts
//!
//! Provides command-line interface for:
//! - cast: Cast a JSON document through a loaded model
//! - fields: Print a model's field registry
//! - models: List loaded models

mod args;
mod commands;
mod config;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{cast, fields, models, run, run_command};
pub use config::Config;
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{read_document, render_error, render_response, write_error, write_response};
