//! Run configuration loaded from JSON.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::data::{CleanOptions, DEFAULT_TARGET};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Config lists no target columns")]
    NoTargets,
}

fn default_targets() -> Vec<String> {
    vec![DEFAULT_TARGET.to_string()]
}

/// Everything needed for one preparation run.
///
/// ```json
/// {
///   "input": "data/PJM_hourly.csv",
///   "targets": ["PJME", "PJMW"],
///   "output_dir": "data/clean",
///   "clean": { "fill_method": "ffill", "upper_quantile": 0.995 }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrepConfig {
    pub input: PathBuf,
    #[serde(default = "default_targets")]
    pub targets: Vec<String>,
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
    #[serde(default)]
    pub clean: CleanOptions,
}

impl PrepConfig {
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            targets: default_targets(),
            output_dir: None,
            clean: CleanOptions::default(),
        }
    }

    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: PrepConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.targets.is_empty() {
            return Err(ConfigError::NoTargets);
        }
        Ok(())
    }

    /// Where the cleaned CSV for `target` is written, if exporting is enabled.
    pub fn output_path(&self, target: &str) -> Option<PathBuf> {
        self.output_dir
            .as_ref()
            .map(|dir| dir.join(format!("{target}_clean.csv")))
    }
}
