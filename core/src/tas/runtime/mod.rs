//! TAS runtime
//!
//! This module contains the per-tick machinery:
//! - **Sequencer**: Hands out one logical frame of a loaded script per tick
//! - **Recorder**: Captures live input as segments
//! - **Results**: Tracks what the game reports back and writes the results log
//! - **Engine**: Owns all of the above plus trigger handling
//! - **Headless**: Runs a script without a game, for tooling and CI

mod engine;
mod headless;
mod recorder;
mod results;
mod sequencer;

pub use engine::{PlaybackStart, TasEngine};
pub use headless::{
    EchoBackend, HeadlessBackend, HeadlessClock, HeadlessConfig, HeadlessRunner, RunSummary,
};
pub use recorder::{RECORDING_SOURCE, Recorder};
pub use results::{CollectableSample, FrameSample, ResultTracker, ResultsLog};
pub use sequencer::{FrameRateHost, PlaybackPhase, Sequencer};
