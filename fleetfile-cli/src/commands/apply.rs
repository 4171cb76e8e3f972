//! `fleetfile apply` — converge the base directory to a manifest.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;

use fleetfile_core::{EventListener, EventLogger, PublisherConfig};
use fleetfile_sync::{ApplyReport, FilesPublisher, WriteResult};

/// Arguments for `fleetfile apply`.
#[derive(Args, Debug)]
pub struct ApplyArgs {
    /// YAML or JSON list of app clusters.
    #[arg(long, short)]
    pub manifest: PathBuf,

    /// Emit the sync report as JSON.
    #[arg(long)]
    pub json: bool,
}

impl ApplyArgs {
    pub fn run(self, config: &PublisherConfig) -> Result<()> {
        let apps = super::load_manifest(&self.manifest)?;

        let mut logger = EventLogger::default();
        let mut publisher = FilesPublisher::new(config);

        logger.startup();
        publisher.startup();
        logger.apply(&apps);
        let outcome = publisher.sync(&apps);
        publisher.shutdown();
        logger.shutdown();

        let report = outcome.with_context(|| {
            format!("apply aborted for {}", publisher.base_path().display())
        })?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            print_report(&report, config.verbose);
        }

        if !report.is_clean() {
            bail!("{} artifact(s) could not be updated", report.failures.len());
        }
        Ok(())
    }
}

fn print_report(report: &ApplyReport, verbose: bool) {
    println!(
        "{} {} new, {} refreshed, {} unchanged, {} removed",
        "✓".green().bold(),
        report.created(),
        report.refreshed(),
        report.unchanged(),
        report.removed.len(),
    );

    for write in &report.writes {
        match write {
            WriteResult::Created { path } => println!("  +  {}", path.display()),
            WriteResult::Refreshed { path } => println!("  ✎  {}", path.display()),
            WriteResult::Unchanged { path } if verbose => println!("  ·  {}", path.display()),
            WriteResult::Unchanged { .. } => {}
        }
    }
    for path in &report.removed {
        println!("  -  {}", path.display());
    }
    for failure in &report.failures {
        println!(
            "  {}  {}: {}",
            "✗".red().bold(),
            failure.path.display(),
            failure.error
        );
    }
}
