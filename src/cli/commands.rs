//! CLI command implementations
//!
//! Each command loads the configuration, opens the model registry and
//! returns the `data` payload of its response. `run` writes the payload,
//! or the error envelope, to stdout.

use std::path::Path;

use serde_json::{json, Value};

use crate::loader::ModelLoader;
use crate::model::Model;
use crate::observability::{log_event_with_fields, Event, Logger};

use super::args::{Cli, Command};
use super::config::Config;
use super::errors::{CliError, CliResult};
use super::io::{read_document, write_error, write_response};

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    let result = run_command(cli);
    if let Err(e) = &result {
        let _ = write_error(e.code_str(), e.message());
    }
    result
}

/// Run the command named by the CLI args
pub fn run_command(cli: Cli) -> CliResult<()> {
    let config = Config::load_or_default(&cli.config)?.with_overrides(&cli);
    Logger::set_min_severity(config.log_level);
    log_event_with_fields(
        Event::ConfigLoaded,
        &[("models_dir", config.models_dir.display().to_string().as_str())],
    );

    let name = command_name(&cli.command);
    log_event_with_fields(Event::CommandStart, &[("command", name)]);

    let result = match cli.command {
        Command::Cast { model, input } => cast(&config, &model, input.as_deref()),
        Command::Fields { model, flat } => fields(&config, &model, flat),
        Command::Models => models(&config),
    };

    match result {
        Ok(data) => {
            log_event_with_fields(Event::CommandComplete, &[("command", name)]);
            write_response(data, config.pretty)
        }
        Err(e) => {
            log_event_with_fields(
                Event::CommandFailed,
                &[("code", e.code_str()), ("command", name)],
            );
            Err(e)
        }
    }
}

/// Cast a document through a model, returning the canonical document
pub fn cast(config: &Config, model: &str, input: Option<&Path>) -> CliResult<Value> {
    let loader = open_registry(config)?;
    let model = lookup(&loader, model)?;
    let document = read_document(input)?;
    let record = model.load(document)?;
    Ok(record.to_value())
}

/// Describe a model's fields, or its flattened registry
pub fn fields(config: &Config, model: &str, flat: bool) -> CliResult<Value> {
    let loader = open_registry(config)?;
    let model = lookup(&loader, model)?;
    let fields = if flat {
        model.describe_flat()
    } else {
        model.describe()
    };
    let mut data = json!({
        "model": model.name(),
        "fields": fields,
    });
    if let Some(doc) = model.doc() {
        data["doc"] = json!(doc);
    }
    if !model.constants().is_empty() {
        data["constants"] = json!(model.constants());
    }
    Ok(data)
}

/// List loaded model names
pub fn models(config: &Config) -> CliResult<Value> {
    let loader = open_registry(config)?;
    let names: Vec<&str> = loader.names().collect();
    Ok(json!(names))
}

fn open_registry(config: &Config) -> CliResult<ModelLoader> {
    let mut loader = ModelLoader::new(&config.models_dir);
    loader.load_all()?;
    Ok(loader)
}

fn lookup<'a>(loader: &'a ModelLoader, name: &str) -> CliResult<&'a std::sync::Arc<Model>> {
    loader.get(name).ok_or_else(|| CliError::unknown_model(name))
}

fn command_name(command: &Command) -> &'static str {
    match command {
        Command::Cast { .. } => "cast",
        Command::Fields { .. } => "fields",
        Command::Models => "models",
    }
}
