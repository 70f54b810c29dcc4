//! Command handlers for CLI subcommands
//!
//! Each subcommand lives in its own module; this module holds the document
//! loading they share.

mod apply;
mod completions;
mod explain;

pub use apply::handle_apply;
pub use completions::handle_completions;
pub use explain::handle_explain;

use crate::error::{Error, Result};
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Serialization format of a document on disk
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Yaml,
}

impl DocumentFormat {
    /// Detect the format from the file extension, defaulting to JSON
    pub fn detect(path: &Path) -> Self {
        match path.extension().and_then(|s| s.to_str()) {
            Some("yaml") | Some("yml") => DocumentFormat::Yaml,
            _ => DocumentFormat::Json,
        }
    }

    fn name(self) -> &'static str {
        match self {
            DocumentFormat::Json => "JSON",
            DocumentFormat::Yaml => "YAML",
        }
    }
}

/// Read and parse a JSON or YAML document
pub fn load_document(path: &Path) -> Result<Value> {
    if !path.exists() {
        return Err(Error::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let content = fs::read_to_string(path)?;
    let format = DocumentFormat::detect(path);
    let parsed = match format {
        DocumentFormat::Yaml => serde_yaml::from_str(&content).ok(),
        DocumentFormat::Json => serde_json::from_str(&content).ok(),
    };

    parsed.ok_or_else(|| Error::InvalidFormat {
        path: path.to_path_buf(),
        expected: format.name().to_string(),
    })
}

/// Serialize a document in the format its path implies
pub fn render_document(path: &Path, document: &Value) -> Result<String> {
    match DocumentFormat::detect(path) {
        DocumentFormat::Yaml => Ok(serde_yaml::to_string(document)?),
        DocumentFormat::Json => {
            let mut rendered = serde_json::to_string_pretty(document)?;
            rendered.push('\n');
            Ok(rendered)
        }
    }
}
