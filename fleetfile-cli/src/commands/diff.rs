//! `fleetfile diff` — show what `apply` would change.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use fleetfile_core::PublisherConfig;
use fleetfile_sync::{plan, PlannedChange};

/// Arguments for `fleetfile diff`.
#[derive(Args, Debug)]
pub struct DiffArgs {
    /// YAML or JSON list of app clusters.
    #[arg(long, short)]
    pub manifest: PathBuf,
}

impl DiffArgs {
    pub fn run(self, config: &PublisherConfig) -> Result<()> {
        let apps = super::load_manifest(&self.manifest)?;
        let plan = plan(&config.base_path, &apps)
            .with_context(|| format!("diff failed for {}", config.base_path.display()))?;

        if plan.is_noop() {
            println!("No differences in {}.", config.base_path.display());
            return Ok(());
        }

        for artifact in &plan.artifacts {
            match &artifact.change {
                PlannedChange::Create => println!("new: {}", artifact.path.display()),
                PlannedChange::Refresh { unified_diff } => {
                    print!("{unified_diff}");
                    if !unified_diff.ends_with('\n') {
                        println!();
                    }
                }
                PlannedChange::Keep => {}
            }
        }
        for path in &plan.superfluous {
            println!("remove: {}", path.display());
        }

        Ok(())
    }
}
