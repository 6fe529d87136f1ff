// Configuration Storage Service
// Loads engine settings (artifact locations, preprocessing switches) from a
// JSON file; absent files fall back to defaults.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct EngineConfig {
    /// Path to the model weight artifact.
    pub model_path: Option<String>,
    /// Path to the vocabulary artifact.
    pub vocabulary_path: Option<String>,
    /// Run the text normalizer before encoding.
    #[serde(default)]
    pub normalize: bool,
    /// Expected sequence length; cross-checked against the model artifact.
    #[serde(default)]
    pub max_len: Option<usize>,
}

pub struct ConfigStore {
    config_file: PathBuf,
}

impl ConfigStore {
    pub fn new(config_file: PathBuf) -> Self {
        Self { config_file }
    }

    /// Default config directory
    pub fn default_config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("spamscan"))
    }

    /// Default config file location
    pub fn default_config_file() -> Option<PathBuf> {
        Self::default_config_dir().map(|p| p.join("config.json"))
    }

    /// Load configuration; a missing file yields the defaults.
    pub fn load(&self) -> Result<EngineConfig, ConfigError> {
        if !self.config_file.exists() {
            return Ok(EngineConfig::default());
        }

        let content = self.read(&self.config_file)?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: self.config_file.display().to_string(),
            source,
        })
    }

    fn read(&self, path: &Path) -> Result<String, ConfigError> {
        fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })
    }
}
