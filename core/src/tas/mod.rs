//! Jak TAS input system
//!
//! Plays prerecorded controller input into the game one logical frame at a
//! time, records live input back into scripts, and logs what the game
//! reports while a script runs.
//!
//! # Architecture
//!
//! ```text
//! Playback:   main.jaktas ─► ScriptLoader ─► SegmentStore ─► Sequencer ─► InputFrame
//!                                                                          │
//!             results.json ◄─ ResultTracker ◄──────────── FrameResults ◄───┘
//!
//! Recording:  live ControllerFrame ─► Recorder ─► write_script ─► .recording.jaktas
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use tas_core::tas::{DirStorage, TasEngine};
//!
//! let config = tas_core::config::load();
//! let storage = DirStorage::new(&config.folder, &config.script_extension);
//! let mut engine = TasEngine::new(storage, config)?;
//!
//! // Every tick:
//! let frame = engine.poll(&live_input, &mut gfx);
//! game.update(&frame);
//! engine.submit_results(&game.frame_results(), &mut gfx);
//! ```

pub mod runtime;
pub mod script;
pub mod storage;
pub mod store;
pub mod types;

pub use runtime::{
    EchoBackend, FrameRateHost, HeadlessBackend, HeadlessConfig, HeadlessRunner, PlaybackPhase,
    PlaybackStart, Recorder, ResultTracker, ResultsLog, RunSummary, Sequencer, TasEngine,
};
pub use script::{
    Diagnostic, LoadError, LoadedScript, ParseIssue, ScriptLoader, ValidationError,
    validate_segments, write_script,
};
pub use storage::{DirStorage, MemoryStorage, ScriptStorage, StorageError};
pub use store::SegmentStore;
pub use types::{
    BUTTON_NAMES, Buttons, ControllerFrame, DEFAULT_FRAME_RATE, FrameResults, InputFrame, Segment,
    SourceLocation, Vec4,
};
