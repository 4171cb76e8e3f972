//! Error types for fleetfile-sync.

use std::path::PathBuf;

use fleetfile_core::AppId;

use thiserror::Error;

/// All errors that can arise from publishing artifacts.
#[derive(Debug, Error)]
pub enum PublishError {
    /// The base directory could not be created. Fatal to a sync pass.
    #[error("cannot create base directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The base directory could not be listed. Fatal to a sync pass.
    #[error("cannot list base directory {path}: {source}")]
    ListDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The id cannot name a file directly under the base directory.
    #[error("invalid app id '{0}'")]
    InvalidId(AppId),

    /// An I/O error on a single artifact, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience constructor for [`PublishError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> PublishError {
    PublishError::Io {
        path: path.into(),
        source,
    }
}
