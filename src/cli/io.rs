//! JSON I/O handling for CLI
//!
//! - Input: one JSON document from a file or stdin
//! - Output: one JSON object on stdout, `{"status": "ok", "data": ...}` or
//!   `{"status": "error", "code": ..., "message": ...}`
//! - UTF-8 only

use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;

use serde_json::{json, Value};

use super::errors::{CliError, CliResult};

/// Read a JSON document from `input`, or from stdin when absent
pub fn read_document(input: Option<&Path>) -> CliResult<Value> {
    let content = match input {
        Some(path) => fs::read_to_string(path).map_err(|e| {
            CliError::io_error(format!("Failed to read {}: {}", path.display(), e))
        })?,
        None => {
            let mut buffer = String::new();
            io::stdin().lock().read_to_string(&mut buffer)?;
            buffer
        }
    };

    if content.trim().is_empty() {
        return Err(CliError::invalid_input("Empty input"));
    }
    Ok(serde_json::from_str(&content)?)
}

/// Render a success response
pub fn render_response(data: Value, pretty: bool) -> CliResult<String> {
    let response = json!({
        "status": "ok",
        "data": data
    });
    render(&response, pretty)
}

/// Render an error response
pub fn render_error(code: &str, message: &str) -> CliResult<String> {
    let response = json!({
        "status": "error",
        "code": code,
        "message": message
    });
    render(&response, false)
}

/// Write a success response to stdout
pub fn write_response(data: Value, pretty: bool) -> CliResult<()> {
    write_line(&render_response(data, pretty)?)
}

/// Write an error response to stdout
pub fn write_error(code: &str, message: &str) -> CliResult<()> {
    write_line(&render_error(code, message)?)
}

fn render(value: &Value, pretty: bool) -> CliResult<String> {
    let text = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(text)
}

fn write_line(text: &str) -> CliResult<()> {
    let mut stdout = io::stdout();
    writeln!(stdout, "{}", text)?;
    stdout.flush()?;
    Ok(())
}
