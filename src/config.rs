//! Pianola configuration: compile, playback and output settings loaded from ~/.pianola/config.yaml.

use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::backend::OutputConfig;
use crate::compile::CompileConfig;
use crate::playback::PlaybackOptions;

/// Errors loading an explicit configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Top-level configuration. Every section is optional in the file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PianolaConfig {
    pub compile: CompileConfig,
    pub playback: PlaybackOptions,
    pub output: OutputConfig,
}

impl PianolaConfig {
    /// Standard config path (~/.pianola/config.yaml).
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".pianola").join("config.yaml"))
    }

    /// Load config from the standard path.
    /// Returns None if the file doesn't exist or doesn't parse.
    pub fn load() -> Option<Self> {
        let path = Self::default_path()?;
        let content = std::fs::read_to_string(&path).ok()?;
        match serde_yaml::from_str(&content) {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring invalid config");
                None
            }
        }
    }

    /// Load config from an explicit path.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}
