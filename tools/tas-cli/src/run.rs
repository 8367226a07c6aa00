//! Play a script headlessly

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use tas_core::tas::{EchoBackend, HeadlessConfig, HeadlessRunner};
use tas_core::{TasConfig, TasEngine};

#[derive(Args)]
pub struct RunArgs {
    /// TAS folder holding the scripts
    pub dir: PathBuf,

    /// Script to play instead of the configured main script
    #[arg(short, long)]
    pub script: Option<String>,

    /// Write every played frame to this JSON file
    #[arg(short, long)]
    pub trace: Option<PathBuf>,

    /// Cancel the run after this many frames
    #[arg(long, default_value = "216000")]
    pub max_frames: u64,
}

pub fn execute(args: RunArgs, config: TasConfig) -> Result<()> {
    let (storage, mut config) = super::open_folder(&args.dir, config);
    if let Some(script) = args.script {
        config.main_script = script;
    }

    println!("Running script: {}", config.main_script);
    println!("  Folder: {}", config.folder.display());
    println!("  Max frames: {}", args.max_frames);

    let engine = TasEngine::new(storage, config).context("Invalid trigger configuration")?;
    let mut runner = HeadlessRunner::new(
        engine,
        HeadlessConfig {
            max_frames: args.max_frames,
            capture_trace: args.trace.is_some(),
        },
    );
    let summary = runner.run_with_backend(&mut EchoBackend)?;

    println!();
    println!("=== Run Complete ===");
    println!("Frames played: {}/{}", summary.frames_played, summary.total_frames);
    println!("Segments: {}", summary.segments);
    println!("Warnings: {}", summary.diagnostics);
    if summary.truncated {
        println!("Stopped at the frame limit.");
    }

    if let Some(trace_path) = args.trace {
        let json = serde_json::to_string_pretty(&summary.trace)?;
        std::fs::write(&trace_path, json)
            .with_context(|| format!("Failed to write trace: {}", trace_path.display()))?;
        println!();
        println!("Trace written to: {}", trace_path.display());
    }

    Ok(())
}
