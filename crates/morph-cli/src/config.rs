//! Configuration management for the CLI
//!
//! Configuration is loaded from the first file found among:
//! - the path given by `--config` or `MORPH_CONFIG`
//! - `.morph.{yaml,yml,json,toml}` in the current directory
//! - `morph/config.{yaml,yml,json,toml}` in the user config directory
//!
//! and falls back to defaults when there is none.

use crate::cli::OutputFormat;
use crate::error::{Error, Result};
use morph_core::{MorphConfig, Morpher};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const EXTENSIONS: [&str; 4] = ["yaml", "yml", "json", "toml"];

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Engine settings: annotation key and directive aliases
    pub morph: MorphConfig,

    /// Rules applied to every document, in order, before `--chain`
    pub rules: Vec<RuleConfig>,

    /// Output settings
    pub output: OutputConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

/// An annotation chain bound to a part of the document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleConfig {
    /// JSON pointer, empty for the whole document
    #[serde(default)]
    pub pointer: String,

    /// Annotation applied to the selected value
    pub chain: String,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Default output format
    pub format: OutputFormat,

    /// Use colored output by default
    pub color: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: Option<String>,

    /// Log format (compact, full, json)
    pub format: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Human,
            color: true,
        }
    }
}

impl Config {
    /// Load configuration from a file, picking the parser by extension
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;

        let config = match path.extension().and_then(|s| s.to_str()) {
            Some("yaml") | Some("yml") => serde_yaml::from_str(&content)?,
            Some("toml") => toml::from_str(&content)?,
            Some("json") | None => serde_json::from_str(&content)?,
            Some(other) => {
                return Err(Error::config(format!(
                    "unsupported configuration format '{}' for {}",
                    other,
                    path.display()
                )))
            }
        };

        Ok(config)
    }

    /// Load configuration from default locations
    pub fn load() -> Result<Self> {
        for path in Self::default_config_paths() {
            if path.exists() {
                match Self::from_file(&path) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        eprintln!("Warning: Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file or default locations
    pub fn load_with_file(file: Option<&Path>) -> Result<Self> {
        if let Some(path) = file {
            Self::from_file(path)
        } else {
            Self::load()
        }
    }

    /// Get default configuration file paths to check
    fn default_config_paths() -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = EXTENSIONS
            .iter()
            .map(|ext| PathBuf::from(format!(".morph.{}", ext)))
            .collect();

        if let Some(config_dir) = dirs::config_dir() {
            let morph_dir = config_dir.join("morph");
            paths.extend(EXTENSIONS.iter().map(|ext| morph_dir.join(format!("config.{}", ext))));
        }

        paths
    }

    /// Build the engine described by the `morph` section
    pub fn morpher(&self) -> Result<Morpher> {
        Ok(Morpher::from_config(&self.morph)?)
    }
}
