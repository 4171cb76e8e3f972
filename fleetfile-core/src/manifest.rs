//! Service manifest — a YAML (or JSON) list of [`AppCluster`]s.
//!
//! ```yaml
//! - id: web
//!   protocol: tcp
//!   service_port: 80
//!   labels:
//!     proto: http
//!   backends:
//!     - { host: 10.0.0.1, port: 9000, state: running }
//! ```

use std::collections::HashSet;
use std::path::Path;

use crate::error::ManifestError;
use crate::types::AppCluster;

/// Load and validate the manifest at `path`.
///
/// Returns `ManifestError::NotFound` if absent, `ManifestError::Parse` (with
/// path + line context) if malformed.
pub fn load_at(path: &Path) -> Result<Vec<AppCluster>, ManifestError> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ManifestError::NotFound {
                path: path.to_path_buf(),
            })
        }
        Err(e) => {
            return Err(ManifestError::Io {
                path: path.to_path_buf(),
                source: e,
            })
        }
    };
    if contents.trim().is_empty() {
        return Ok(Vec::new());
    }
    let apps: Vec<AppCluster> =
        serde_yaml::from_str(&contents).map_err(|e| ManifestError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;
    validate(&apps)?;
    Ok(apps)
}

/// Check that every id is a usable filename stem and unique across `apps`.
pub fn validate(apps: &[AppCluster]) -> Result<(), ManifestError> {
    let mut seen = HashSet::new();
    for app in apps {
        if !app.id.is_valid_stem() {
            return Err(ManifestError::InvalidId(app.id.clone()));
        }
        if !seen.insert(&app.id) {
            return Err(ManifestError::DuplicateId(app.id.clone()));
        }
    }
    Ok(())
}
