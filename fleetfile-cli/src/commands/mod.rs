pub mod apply;
pub mod diff;
pub mod render;

use std::path::Path;

use anyhow::{Context, Result};

use fleetfile_core::{config, manifest, AppCluster, PublisherConfig};

use crate::GlobalArgs;

/// Config file values, overridden by command-line flags.
pub fn resolve_config(global: &GlobalArgs) -> Result<PublisherConfig> {
    let path = match &global.config {
        Some(path) => path.clone(),
        None => config::default_config_path()?,
    };
    let mut config = config::load_at(&path)
        .with_context(|| format!("failed to load config from {}", path.display()))?;
    if let Some(base_path) = &global.base_path {
        config.base_path = base_path.clone();
    }
    config.verbose |= global.verbose;
    tracing::debug!(
        "config {}: base_path={} verbose={}",
        path.display(),
        config.base_path.display(),
        config.verbose
    );
    Ok(config)
}

pub fn load_manifest(path: &Path) -> Result<Vec<AppCluster>> {
    manifest::load_at(path).with_context(|| format!("invalid manifest {}", path.display()))
}
