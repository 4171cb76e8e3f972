//! Publisher configuration.
//!
//! # Storage layout
//!
//! ```text
//! <config_dir>/fleetfile/config.yaml
//! ```
//!
//! ```yaml
//! base_path: /var/run/fleetfile
//! verbose: false
//! ```
//!
//! Every field is optional. A missing file yields [`PublisherConfig::default`].

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Where artifacts land when nothing else is configured.
pub const DEFAULT_BASE_PATH: &str = "/var/run/fleetfile";

/// Settings consumed by the file publisher and the event logger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PublisherConfig {
    /// Directory holding one `<id>.instances` file per cluster.
    pub base_path: PathBuf,
    /// Log per-artifact activity (new / refresh / removal), not only failures.
    pub verbose: bool,
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            base_path: PathBuf::from(DEFAULT_BASE_PATH),
            verbose: false,
        }
    }
}

/// `<config_dir>/fleetfile/config.yaml` — pure, no I/O.
pub fn config_path_at(config_dir: &Path) -> PathBuf {
    config_dir.join("fleetfile").join("config.yaml")
}

/// Default config file location, derived from `dirs::config_dir()`.
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    dirs::config_dir()
        .map(|dir| config_path_at(&dir))
        .ok_or(ConfigError::ConfigDirNotFound)
}

/// Load the configuration at `path`.
///
/// Returns defaults if the file does not exist, `ConfigError::Parse` (with path)
/// if it is malformed.
pub fn load_at(path: &Path) -> Result<PublisherConfig, ConfigError> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Ok(PublisherConfig::default())
        }
        Err(e) => {
            return Err(ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            })
        }
    };
    // An empty file parses as YAML null, which is not a mapping.
    if contents.trim().is_empty() {
        return Ok(PublisherConfig::default());
    }
    serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        source: e,
    })
}

/// `load_at` convenience wrapper using [`default_config_path`].
pub fn load() -> Result<PublisherConfig, ConfigError> {
    load_at(&default_config_path()?)
}
