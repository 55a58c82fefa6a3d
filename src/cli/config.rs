//! CLI configuration
//!
//! Read from an optional JSON file (`./draughts.json` by default). Every
//! key has a default; command-line flags override the file.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::args::Cli;
use super::errors::{CliError, CliResult};
use crate::observability::Severity;

/// Configuration file structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Directory of model declaration files
    #[serde(default = "default_models_dir")]
    pub models_dir: PathBuf,

    /// Minimum severity written to the log
    #[serde(default = "default_log_level")]
    pub log_level: Severity,

    /// Pretty-print JSON output
    #[serde(default)]
    pub pretty: bool,
}

fn default_models_dir() -> PathBuf {
    PathBuf::from("./models")
}

fn default_log_level() -> Severity {
    Severity::Warn
}

impl Default for Config {
    fn default() -> Self {
        Self {
            models_dir: default_models_dir(),
            log_level: default_log_level(),
            pretty: false,
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;

        let config: Config = serde_json::from_str(&content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from file, or defaults when the file is absent
    pub fn load_or_default(path: &Path) -> CliResult<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Applies command-line overrides.
    pub fn with_overrides(mut self, cli: &Cli) -> Self {
        if let Some(dir) = &cli.models_dir {
            self.models_dir = dir.clone();
        }
        if let Some(level) = cli.log_level {
            self.log_level = level;
        }
        self.pretty |= cli.pretty;
        self
    }

    fn validate(&self) -> CliResult<()> {
        if self.models_dir.as_os_str().is_empty() {
            return Err(CliError::config_error("models_dir must not be empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_when_file_missing() {
        let temp = TempDir::new().unwrap();
        let config = Config::load_or_default(&temp.path().join("draughts.json")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("draughts.json");
        fs::write(&path, r#"{"log_level": "info"}"#).unwrap();
        let config = Config::load(&path).unwrap();
        assert_eq!(config.log_level, Severity::Info);
        assert_eq!(config.models_dir, PathBuf::from("./models"));
        assert!(!config.pretty);
    }

    #[test]
    fn test_invalid_config() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("draughts.json");
        fs::write(&path, r#"{"models_dir": ""}"#).unwrap();
        assert!(Config::load(&path).is_err());
        fs::write(&path, r#"{"log_level": "loud"}"#).unwrap();
        assert_eq!(
            Config::load(&path).unwrap_err().code_str(),
            "DRAUGHTS_CLI_CONFIG_ERROR"
        );
    }

    #[test]
    fn test_flags_override_file() {
        let cli = Cli::try_parse_from([
            "draughts",
            "--models-dir",
            "/srv/models",
            "--pretty",
            "models",
        ])
        .unwrap();
        let config = Config::default().with_overrides(&cli);
        assert_eq!(config.models_dir, PathBuf::from("/srv/models"));
        assert!(config.pretty);
        assert_eq!(config.log_level, Severity::Warn);
    }
}
