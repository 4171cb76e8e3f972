//! `fleetfile render` — print one cluster's artifact.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use fleetfile_sync::render;

/// Arguments for `fleetfile render`.
#[derive(Args, Debug)]
pub struct RenderArgs {
    /// YAML or JSON list of app clusters.
    #[arg(long, short)]
    pub manifest: PathBuf,

    /// Id of the cluster to render.
    pub id: String,
}

impl RenderArgs {
    pub fn run(self) -> Result<()> {
        let apps = super::load_manifest(&self.manifest)?;
        let app = apps
            .iter()
            .find(|app| app.id.as_str() == self.id)
            .with_context(|| format!("no cluster '{}' in {}", self.id, self.manifest.display()))?;

        // Raw bytes: the header block is CRLF-terminated.
        std::io::stdout()
            .write_all(render(app).as_bytes())
            .context("failed to write to stdout")?;
        Ok(())
    }
}
