//! fleetfile — publish service topology as load-balancer instance files.
//!
//! # Usage
//!
//! ```text
//! fleetfile [--config <file>] [--base-path <dir>] [--verbose] apply --manifest <file> [--json]
//! fleetfile [...] diff --manifest <file>
//! fleetfile [...] render --manifest <file> <id>
//! ```

mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};

use commands::{apply::ApplyArgs, diff::DiffArgs, render::RenderArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "fleetfile",
    version,
    about = "Publish app cluster topology as per-service instance files",
    long_about = None,
)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Flags shared by every subcommand; they override the config file.
#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// Config file (default: `<config_dir>/fleetfile/config.yaml`).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory receiving the `<id>.instances` files.
    #[arg(long, global = true)]
    pub base_path: Option<PathBuf>,

    /// Log every created, refreshed and removed artifact.
    #[arg(long, short, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Converge the base directory to the clusters in a manifest.
    Apply(ApplyArgs),

    /// Show what `apply` would change, without writing anything.
    Diff(DiffArgs),

    /// Print the artifact of one cluster to stdout.
    Render(RenderArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.global.verbose);
    let config = commands::resolve_config(&cli.global)?;
    match cli.command {
        Commands::Apply(args) => args.run(&config),
        Commands::Diff(args) => args.run(&config),
        Commands::Render(args) => args.run(),
    }
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
