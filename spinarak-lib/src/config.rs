//! Configuration file parsing and management.
//!
//! This module handles loading configuration from TOML files and
//! `SPINARAK_*` environment variables, and merging them with proper
//! precedence rules.

use crate::error::SpinarakError;
use crate::types::{validate_word, OutputFormat};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Configuration loaded from TOML files.
///
/// ```toml
/// [defaults]
/// word = "rust"
/// workers = 4
///
/// [output]
/// format = "json"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FileConfig {
    /// Default values for CLI options
    #[serde(skip_serializing_if = "Option::is_none")]
    pub defaults: Option<DefaultsConfig>,

    /// Output formatting preferences
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<OutputConfig>,
}

/// Default configuration values that map to CLI options.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DefaultsConfig {
    /// Default target word
    #[serde(skip_serializing_if = "Option::is_none")]
    pub word: Option<String>,

    /// Default number of workers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workers: Option<usize>,

    /// User-Agent header for requests
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

/// Output formatting configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct OutputConfig {
    /// Default output format ("text" or "json")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    /// Colored output with a summary
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pretty: Option<bool>,
}

impl FileConfig {
    /// The configured output format, if any and valid.
    pub fn output_format(&self) -> Option<OutputFormat> {
        self.output
            .as_ref()
            .and_then(|o| o.format.as_deref())
            .and_then(|f| f.parse().ok())
    }
}

/// Configuration discovery and loading functionality.
#[derive(Debug, Default)]
pub struct ConfigManager;

impl ConfigManager {
    pub fn new() -> Self {
        Self
    }

    /// Load configuration from a specific file.
    pub fn load_file<P: AsRef<Path>>(&self, path: P) -> Result<FileConfig, SpinarakError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(SpinarakError::file_error(
                path.to_string_lossy(),
                "Configuration file not found",
            ));
        }

        let content = fs::read_to_string(path).map_err(|e| {
            SpinarakError::file_error(
                path.to_string_lossy(),
                format!("Failed to read configuration file: {}", e),
            )
        })?;

        let config: FileConfig = toml::from_str(&content)?;
        self.validate_config(&config)?;

        info!(path = %path.display(), "loaded config file");
        Ok(config)
    }

    /// Discover and load configuration files in precedence order.
    ///
    /// XDG config is lowest, then `~/.spinarak.toml`, then a file in the
    /// current directory. Files that fail to load are skipped with a warning.
    pub fn discover_and_load(&self) -> Result<FileConfig, SpinarakError> {
        let mut merged_config = FileConfig::default();

        let candidates = [
            self.get_xdg_config_path(),
            self.get_global_config_path(),
            self.get_local_config_path(),
        ];

        for path in candidates.into_iter().flatten() {
            match self.load_file(&path) {
                Ok(config) => merged_config = self.merge_configs(merged_config, config),
                Err(e) => warn!(path = %path.display(), error = %e, "ignoring config file"),
            }
        }

        Ok(merged_config)
    }

    fn get_local_config_path(&self) -> Option<PathBuf> {
        ["./spinarak.toml", "./.spinarak.toml"]
            .iter()
            .map(Path::new)
            .find(|path| path.exists())
            .map(Path::to_path_buf)
    }

    fn get_global_config_path(&self) -> Option<PathBuf> {
        let home = env::var_os("HOME")?;
        [".spinarak.toml", "spinarak.toml"]
            .iter()
            .map(|candidate| Path::new(&home).join(candidate))
            .find(|path| path.exists())
    }

    /// Follows the XDG Base Directory Specification.
    fn get_xdg_config_path(&self) -> Option<PathBuf> {
        let config_dir = env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| env::var_os("HOME").map(|home| Path::new(&home).join(".config")))?;

        let path = config_dir.join("spinarak").join("config.toml");
        path.exists().then_some(path)
    }

    /// Merge two configurations; values from `higher` win.
    fn merge_configs(&self, lower: FileConfig, higher: FileConfig) -> FileConfig {
        FileConfig {
            defaults: match (lower.defaults, higher.defaults) {
                (Some(mut lower_defaults), Some(higher_defaults)) => {
                    if higher_defaults.word.is_some() {
                        lower_defaults.word = higher_defaults.word;
                    }
                    if higher_defaults.workers.is_some() {
                        lower_defaults.workers = higher_defaults.workers;
                    }
                    if higher_defaults.user_agent.is_some() {
                        lower_defaults.user_agent = higher_defaults.user_agent;
                    }
                    Some(lower_defaults)
                }
                (lower_defaults, higher_defaults) => higher_defaults.or(lower_defaults),
            },
            output: match (lower.output, higher.output) {
                (Some(mut lower_output), Some(higher_output)) => {
                    if higher_output.format.is_some() {
                        lower_output.format = higher_output.format;
                    }
                    if higher_output.pretty.is_some() {
                        lower_output.pretty = higher_output.pretty;
                    }
                    Some(lower_output)
                }
                (lower_output, higher_output) => higher_output.or(lower_output),
            },
        }
    }

    fn validate_config(&self, config: &FileConfig) -> Result<(), SpinarakError> {
        if let Some(defaults) = &config.defaults {
            if defaults.workers == Some(0) {
                return Err(SpinarakError::config(
                    "Number of workers must be greater than 0",
                ));
            }
            if let Some(word) = &defaults.word {
                validate_word(word)?;
            }
        }

        if let Some(format) = config.output.as_ref().and_then(|o| o.format.as_deref()) {
            format.parse::<OutputFormat>()?;
        }

        Ok(())
    }
}

/// Environment variable configuration that mirrors CLI options.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnvConfig {
    pub word: Option<String>,
    pub workers: Option<usize>,
    pub json: Option<bool>,
    pub pretty: Option<bool>,
    pub config: Option<String>,
}

/// Load configuration from `SPINARAK_*` environment variables.
///
/// Invalid values are logged as warnings and ignored.
pub fn load_env_config() -> EnvConfig {
    EnvConfig::from_lookup(|key| env::var(key).ok())
}

impl EnvConfig {
    /// Build from any key lookup; `load_env_config` uses the process
    /// environment.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut env_config = EnvConfig::default();

        // SPINARAK_WORD - target word
        if let Some(word) = lookup("SPINARAK_WORD") {
            match validate_word(&word) {
                Ok(()) => env_config.word = Some(word),
                Err(e) => warn!(value = %word, error = %e, "ignoring SPINARAK_WORD"),
            }
        }

        // SPINARAK_WORKERS - concurrent fetch workers
        if let Some(val) = lookup("SPINARAK_WORKERS") {
            match val.trim().parse::<usize>() {
                Ok(workers) if workers > 0 => env_config.workers = Some(workers),
                _ => warn!(value = %val, "ignoring SPINARAK_WORKERS, must be a positive integer"),
            }
        }

        // SPINARAK_JSON - JSON output
        if let Some(val) = lookup("SPINARAK_JSON") {
            env_config.json = parse_bool("SPINARAK_JSON", &val);
        }

        // SPINARAK_PRETTY - colored output
        if let Some(val) = lookup("SPINARAK_PRETTY") {
            env_config.pretty = parse_bool("SPINARAK_PRETTY", &val);
        }

        // SPINARAK_CONFIG - explicit config file
        if let Some(path) = lookup("SPINARAK_CONFIG") {
            if !path.trim().is_empty() {
                env_config.config = Some(path);
            }
        }

        env_config
    }
}

fn parse_bool(key: &str, value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => {
            warn!(key, value, "ignoring invalid boolean, use true/false");
            None
        }
    }
}
