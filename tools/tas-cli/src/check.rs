//! Load a script without running it

use anyhow::{Context, Result, bail};
use clap::Args;
use std::path::PathBuf;

use tas_core::tas::{LoadedScript, ScriptLoader, validate_segments};
use tas_core::{ScriptStorage, TasConfig};

#[derive(Args)]
pub struct CheckArgs {
    /// TAS folder holding the scripts
    pub dir: PathBuf,

    /// Script to load instead of the configured main script
    #[arg(short, long)]
    pub script: Option<String>,

    /// Treat warnings as errors
    #[arg(long)]
    pub strict: bool,
}

pub fn execute(args: CheckArgs, config: TasConfig) -> Result<()> {
    let (storage, config) = super::open_folder(&args.dir, config);
    let name = args.script.unwrap_or_else(|| config.main_script.clone());

    println!("Checking script: {}", storage.script_location(&name));

    let loaded = ScriptLoader::with_config(&storage, &config)
        .load(&name)
        .with_context(|| format!("Failed to load script: {name}"))?;

    print_segments(&loaded);

    validate_segments(&loaded.segments).context("Segments do not cover a contiguous frame range")?;

    if !loaded.diagnostics.is_empty() {
        println!();
        println!("=== Warnings ===");
        for diagnostic in &loaded.diagnostics {
            println!("  {diagnostic}");
        }
        if args.strict {
            bail!("{} warning(s) in strict mode", loaded.diagnostics.len());
        }
    }

    println!();
    println!("Script OK.");
    Ok(())
}

fn print_segments(loaded: &LoadedScript) {
    println!();
    println!("=== Segments ===");
    for segment in &loaded.segments {
        let mut line = format!(
            "  {:>6}-{:<6} {:<24} rate={}",
            segment.first_frame,
            segment.last_frame,
            segment.buttons.to_string(),
            segment.frame_rate
        );
        if segment.skip_spool_movies {
            line.push_str(" skip-spool-movies");
        }
        if let Some(marker) = &segment.marker {
            line.push_str(&format!(" marker={marker}"));
        }
        println!("{line}  ({})", segment.source);
    }

    println!();
    println!("Segments: {}", loaded.segments.len());
    println!("Frames: {}", loaded.segments.frame_count());
    println!("Saves results: {}", loaded.save_results);
}
