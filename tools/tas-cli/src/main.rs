//! jaktas - Command line tool for TAS scripts
//!
//! # Commands
//!
//! - `jaktas check <dir>` - Load a script, list its segments and warnings
//! - `jaktas run <dir>` - Play a script headlessly, optionally dumping frames
//! - `jaktas record <dir> --trace FILE` - Turn a controller trace into a script
//!
//! # Usage
//!
//! ```bash
//! # Check the main script in the default TAS folder
//! jaktas check tas/jak1
//!
//! # Play a different script and dump every frame
//! jaktas run tas/jak1 --script any-percent --trace frames.json
//!
//! # Compress a captured trace into a .recording.jaktas script
//! jaktas record tas/jak1 --trace captured.json
//! ```

mod check;
mod record;
mod run;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use tas_core::{DirStorage, TasConfig, config};

/// jaktas - TAS script tool
#[derive(Parser)]
#[command(name = "jaktas")]
#[command(about = "Check, run and record TAS scripts")]
#[command(version)]
struct Cli {
    /// TOML config file (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a script and report its segments and warnings
    Check(check::CheckArgs),

    /// Play a script without the game
    Run(run::RunArgs),

    /// Compress a JSON controller trace into a recording script
    Record(record::RecordArgs),
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => config::load_from(path),
        None => config::load(),
    };
    tracing::debug!(path = ?cli.config, folder = %config.folder.display(), "Loaded TAS config");

    match cli.command {
        Commands::Check(args) => check::execute(args, config),
        Commands::Run(args) => run::execute(args, config),
        Commands::Record(args) => record::execute(args, config),
    }
}

/// Point the config at `dir` and open storage there
fn open_folder(dir: &Path, mut config: TasConfig) -> (DirStorage, TasConfig) {
    config.folder = dir.to_path_buf();
    let storage = DirStorage::new(&config.folder, &config.script_extension);
    (storage, config)
}
