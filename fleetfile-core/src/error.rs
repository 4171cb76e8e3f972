//! Error types for fleetfile-core.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::AppId;

/// Errors from loading the publisher configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML parse error on load — includes file path and line context from serde_yaml.
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// `dirs::config_dir()` returned `None`.
    #[error("cannot determine config directory; pass --config explicitly")]
    ConfigDirNotFound,
}

/// Errors from loading or validating a service manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("manifest not found at {path}")]
    NotFound { path: PathBuf },

    #[error("failed to parse manifest at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// Two clusters share an id; their artifacts would overwrite each other.
    #[error("duplicate app id '{0}'")]
    DuplicateId(AppId),

    /// The id cannot be used as a filename stem.
    #[error("invalid app id '{0}'")]
    InvalidId(AppId),
}
