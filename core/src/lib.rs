//! TAS Core - Frame-exact input playback and recording
//!
//! This crate provides the script format, playback engine and recorder used
//! to drive the game with prerecorded controller input.
//!
//! # Architecture
//!
//! - [`TasEngine`] - Per-tick trigger handling, playback, recording and results
//! - [`ScriptLoader`] - Reads `.jaktas` scripts (and their imports) into segments
//! - [`ScriptStorage`] - Where scripts are read from and output is written to
//! - [`HeadlessRunner`] - Plays a script without a game for tooling and CI

pub mod config;
#[cfg(test)]
mod integration;
pub mod tas;

// Re-export core types
pub use config::{ConfigError, TasConfig, TriggerConfig, Triggers};
pub use tas::{
    Buttons, ControllerFrame, DirStorage, FrameRateHost, FrameResults, HeadlessBackend,
    HeadlessRunner, InputFrame, LoadError, MemoryStorage, ScriptLoader, ScriptStorage, Segment,
    SegmentStore, TasEngine,
};
