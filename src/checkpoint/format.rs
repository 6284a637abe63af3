//! Checkpoint serialization format definitions

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Supported formats for full checkpoints
///
/// Weights-only model files use SafeTensors and are handled separately
/// (see [`save_model`](crate::checkpoint::save_model)).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheckpointFormat {
    /// JSON format (human-readable, larger file size)
    Json,

    /// YAML format (human-readable)
    Yaml,
}

impl CheckpointFormat {
    /// Get file extension for this format
    pub fn extension(&self) -> &str {
        match self {
            CheckpointFormat::Json => "json",
            CheckpointFormat::Yaml => "yaml",
        }
    }

    /// Detect format from file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "json" => Some(CheckpointFormat::Json),
            "yaml" | "yml" => Some(CheckpointFormat::Yaml),
            _ => None,
        }
    }

    /// Detect format from a file path
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .ok_or_else(|| Error::Serialization("File has no extension".to_string()))?;

        Self::from_extension(ext)
            .ok_or_else(|| Error::Serialization(format!("Unsupported file extension: {ext}")))
    }
}
