//! Compress a controller trace into a recording script

use anyhow::{Context, Result};
use clap::Args;
use std::path::{Path, PathBuf};

use tas_core::tas::{Recorder, write_script};
use tas_core::{ControllerFrame, ScriptStorage, TasConfig};

#[derive(Args)]
pub struct RecordArgs {
    /// TAS folder to write the recording into
    pub dir: PathBuf,

    /// JSON array of controller frames
    #[arg(short, long)]
    pub trace: PathBuf,
}

pub fn execute(args: RecordArgs, config: TasConfig) -> Result<()> {
    let (mut storage, config) = super::open_folder(&args.dir, config);

    let frames = read_trace(&args.trace)?;
    let segments = Recorder::record_all(&frames);

    let now = chrono::Utc::now();
    let header = [
        format!("Recorded from {}", args.trace.display()),
        format!("{} frames", segments.frame_count()),
    ];
    let file_name = format!("{}{}", now.timestamp(), config.recording_extension);
    storage
        .write_output(&file_name, &write_script(&segments, &header))
        .with_context(|| format!("Failed to write recording: {file_name}"))?;

    println!("Recorded {} frames in {} segments", segments.frame_count(), segments.len());
    println!("Written to: {}", config.folder.join(&file_name).display());
    Ok(())
}

fn read_trace(path: &Path) -> Result<Vec<ControllerFrame>> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read trace: {}", path.display()))?;
    serde_json::from_str(&json).with_context(|| format!("Failed to parse trace: {}", path.display()))
}
