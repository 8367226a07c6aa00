//! Headless TAS execution
//!
//! Drives an engine through a whole run without a game window. Used by the
//! CLI and for testing scripts in CI.

use anyhow::{Context, Result};

use super::engine::TasEngine;
use super::sequencer::FrameRateHost;
use crate::tas::storage::ScriptStorage;
use crate::tas::types::{ControllerFrame, DEFAULT_FRAME_RATE, FrameResults, InputFrame};

/// Headless runner configuration
#[derive(Debug, Clone)]
pub struct HeadlessConfig {
    /// Cancel the run after this many frames
    pub max_frames: u64,
    /// Keep every handed out frame in the summary
    pub capture_trace: bool,
}

impl Default for HeadlessConfig {
    fn default() -> Self {
        Self {
            // One hour at 60fps
            max_frames: 216_000,
            capture_trace: false,
        }
    }
}

/// Stand-in for the game during headless runs
pub trait HeadlessBackend {
    /// Consume one input frame and report what happened
    fn step(&mut self, frame: &InputFrame) -> Result<FrameResults>;
}

/// Backend that reports the input back and nothing else
#[derive(Debug, Clone, Default)]
pub struct EchoBackend;

impl HeadlessBackend for EchoBackend {
    fn step(&mut self, frame: &InputFrame) -> Result<FrameResults> {
        Ok(FrameResults {
            tas_frame: frame.tas_frame,
            input_buttons: frame.buttons,
            input_player_angle: frame.player_angle,
            input_player_speed: frame.player_speed,
            input_camera_angle: frame.camera_angle,
            input_camera_zoom: frame.camera_zoom,
            ..Default::default()
        })
    }
}

/// Frame rate holder for headless runs
#[derive(Debug, Clone)]
pub struct HeadlessClock {
    rate: u32,
    changes: u32,
}

impl Default for HeadlessClock {
    fn default() -> Self {
        Self {
            rate: DEFAULT_FRAME_RATE,
            changes: 0,
        }
    }
}

impl HeadlessClock {
    /// Number of frame rate changes requested so far
    pub fn changes(&self) -> u32 {
        self.changes
    }
}

impl FrameRateHost for HeadlessClock {
    fn frame_rate(&self) -> u32 {
        self.rate
    }

    fn set_frame_rate(&mut self, rate: u32) {
        self.rate = rate;
        self.changes += 1;
    }
}

/// Outcome of a headless run
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct RunSummary {
    /// Frames handed to the backend
    pub frames_played: u64,
    /// Frames the script covers
    pub total_frames: u64,
    pub segments: usize,
    /// Warnings from loading the script
    pub diagnostics: usize,
    /// Stopped by the frame limit
    pub truncated: bool,
    /// Frame rate when the run ended
    pub final_frame_rate: u32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub trace: Vec<InputFrame>,
}

/// Headless TAS runner
pub struct HeadlessRunner<S: ScriptStorage> {
    engine: TasEngine<S>,
    config: HeadlessConfig,
    clock: HeadlessClock,
}

impl<S: ScriptStorage> HeadlessRunner<S> {
    pub fn new(engine: TasEngine<S>, config: HeadlessConfig) -> Self {
        Self {
            engine,
            config,
            clock: HeadlessClock::default(),
        }
    }

    /// Play the main script to the end with `backend`
    pub fn run_with_backend<B: HeadlessBackend>(&mut self, backend: &mut B) -> Result<RunSummary> {
        self.engine
            .start_playback(&mut self.clock)
            .context("Failed to load TAS inputs")?;

        let mut summary = RunSummary {
            total_frames: self.engine.segments().frame_count(),
            segments: self.engine.segments().len(),
            diagnostics: self.engine.diagnostics().len(),
            ..Default::default()
        };

        // No live input reaches the engine in headless mode
        let live = ControllerFrame::default();
        while self.engine.is_playing() {
            if summary.frames_played >= self.config.max_frames {
                tracing::warn!(
                    limit = self.config.max_frames,
                    "[TAS Playback] Frame limit reached, cancelling"
                );
                self.engine.cancel_playback(&mut self.clock);
                summary.truncated = true;
                break;
            }

            let frame = self.engine.poll(&live, &mut self.clock);
            if !frame.is_active() {
                break;
            }

            let results = backend
                .step(&frame)
                .with_context(|| format!("Backend failed at frame {}", frame.tas_frame))?;
            self.engine.submit_results(&results, &mut self.clock);

            summary.frames_played += 1;
            if self.config.capture_trace {
                summary.trace.push(frame);
            }
        }

        summary.final_frame_rate = self.clock.frame_rate();
        Ok(summary)
    }

    /// Play the main script with an [`EchoBackend`]
    pub fn run(&mut self) -> Result<RunSummary> {
        self.run_with_backend(&mut EchoBackend)
    }

    pub fn engine(&self) -> &TasEngine<S> {
        &self.engine
    }

    pub fn clock(&self) -> &HeadlessClock {
        &self.clock
    }

    pub fn into_engine(self) -> TasEngine<S> {
        self.engine
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TasConfig;
    use crate::tas::storage::MemoryStorage;
    use crate::tas::types::Buttons;

    fn runner(main: &str, config: HeadlessConfig) -> HeadlessRunner<MemoryStorage> {
        let storage = MemoryStorage::new().with_script("main", main);
        let engine = TasEngine::new(storage, TasConfig::default()).unwrap();
        HeadlessRunner::new(engine, config)
    }

    #[test]
    fn test_run_to_end() {
        let mut runner = runner(
            "frame-rate=30\n3,X\n2,Circle\n",
            HeadlessConfig {
                capture_trace: true,
                ..Default::default()
            },
        );
        let summary = runner.run().unwrap();

        assert_eq!(summary.frames_played, 5);
        assert_eq!(summary.total_frames, 5);
        assert_eq!(summary.segments, 2);
        assert!(!summary.truncated);
        assert_eq!(summary.final_frame_rate, 60);
        assert_eq!(runner.clock().changes(), 2);

        let buttons: Vec<_> = summary.trace.iter().map(|f| f.buttons).collect();
        assert_eq!(
            buttons,
            vec![
                Buttons::X,
                Buttons::X,
                Buttons::X,
                Buttons::CIRCLE,
                Buttons::CIRCLE
            ]
        );
        assert!(!runner.engine().is_playing());
    }

    #[test]
    fn test_frame_limit() {
        let mut runner = runner(
            "save-results=true\n100\n",
            HeadlessConfig {
                max_frames: 10,
                ..Default::default()
            },
        );
        let summary = runner.run().unwrap();

        assert!(summary.truncated);
        assert_eq!(summary.frames_played, 10);
        assert!(summary.trace.is_empty());

        let engine = runner.into_engine();
        assert!(
            engine
                .storage()
                .output_ending_with(".automated.results.json")
                .is_some()
        );
    }

    #[test]
    fn test_backend_error_stops_run() {
        struct Failing;
        impl HeadlessBackend for Failing {
            fn step(&mut self, frame: &InputFrame) -> Result<FrameResults> {
                if frame.tas_frame == 3 {
                    anyhow::bail!("crashed");
                }
                EchoBackend.step(frame)
            }
        }

        let mut runner = runner("10\n", HeadlessConfig::default());
        let error = runner.run_with_backend(&mut Failing).unwrap_err();
        assert!(format!("{error:#}").contains("frame 3"));
    }

    #[test]
    fn test_load_error() {
        let storage = MemoryStorage::new().with_script("main", "import=main\n");
        let engine = TasEngine::new(storage, TasConfig::default()).unwrap();
        let mut runner = HeadlessRunner::new(engine, HeadlessConfig::default());
        assert!(runner.run().is_err());
    }
}
