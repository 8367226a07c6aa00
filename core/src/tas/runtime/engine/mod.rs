//! TAS engine
//!
//! Ties the sequencer, recorder and result tracker to the game loop. The game
//! calls [`TasEngine::poll`] once per tick before its update and
//! [`TasEngine::submit_results`] after it.


use crate::config::{ConfigError, TasConfig, Triggers};
use crate::tas::runtime::recorder::Recorder;
use crate::tas::runtime::results::ResultTracker;
use crate::tas::runtime::sequencer::{FrameRateHost, PlaybackPhase, Sequencer};
use crate::tas::script::{Diagnostic, LoadError, ScriptLoader, write_script};
use crate::tas::storage::{ScriptStorage, StorageError};
use crate::tas::store::SegmentStore;
use crate::tas::types::{Buttons, ControllerFrame, FrameResults, InputFrame};

/// What a call to [`TasEngine::start_playback`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackStart {
    /// Inputs loaded and the run is playing
    Started,
    /// Script loaded but had no frames, the run already ended
    NoInputs,
    /// A run is already in progress and was left alone
    AlreadyPlaying,
    /// Recording is active, nothing was loaded
    Recording,
}

/// TAS engine state
pub struct TasEngine<S: ScriptStorage> {
    config: TasConfig,
    triggers: Triggers,
    storage: S,
    sequencer: Sequencer,
    recorder: Recorder,
    tracker: ResultTracker,
    /// Write a results log when the current run ends
    save_results: bool,
    /// Diagnostics from the last script load
    diagnostics: Vec<Diagnostic>,
    /// Live buttons seen on the previous poll
    previous_buttons: Buttons,
}

impl<S: ScriptStorage> TasEngine<S> {
    /// Create an engine, resolving the configured triggers
    pub fn new(storage: S, config: TasConfig) -> Result<Self, ConfigError> {
        let triggers = config.triggers.resolve()?;
        Ok(Self::with_triggers(storage, config, triggers))
    }

    /// Create an engine with already resolved triggers
    pub fn with_triggers(storage: S, config: TasConfig, triggers: Triggers) -> Self {
        Self {
            config,
            triggers,
            storage,
            sequencer: Sequencer::new(),
            recorder: Recorder::new(),
            tracker: ResultTracker::new(),
            save_results: false,
            diagnostics: Vec::new(),
            previous_buttons: Buttons::empty(),
        }
    }

    /// Run one tick and return the frame the game should consume
    ///
    /// While playback runs the returned frame replaces live input entirely.
    pub fn poll(&mut self, live: &ControllerFrame, host: &mut dyn FrameRateHost) -> InputFrame {
        let toggled_recording = self.handle_triggers(live.buttons, host);

        // Final results never arrived, close the run now
        if self.sequencer.phase() == PlaybackPhase::Completing {
            self.finalize(host);
        }

        let output = self
            .sequencer
            .tick(host)
            .unwrap_or_else(|| InputFrame {
                frame_rate: self.config.default_frame_rate,
                ..InputFrame::idle(self.recorder.is_recording())
            });

        if !toggled_recording {
            self.recorder.record(live);
        }

        output
    }

    /// Hand over what the game did with the last frame
    pub fn submit_results(&mut self, results: &FrameResults, host: &mut dyn FrameRateHost) {
        if !self.sequencer.is_active() || results.tas_frame == 0 {
            return;
        }

        let store = self.sequencer.store();
        let marker = store
            .segment_index_at(results.tas_frame)
            .and_then(|index| store.get(index))
            .and_then(|segment| segment.marker.as_deref());
        self.tracker.record(results, marker);

        if self.sequencer.phase() == PlaybackPhase::Completing {
            self.finalize(host);
        }
    }

    /// Returns true when the recorder was toggled
    fn handle_triggers(&mut self, buttons: Buttons, host: &mut dyn FrameRateHost) -> bool {
        let changed = buttons != self.previous_buttons;
        self.previous_buttons = buttons;
        if !changed {
            return false;
        }

        if self.sequencer.is_active() {
            if buttons == self.triggers.cancel_playback {
                tracing::info!(
                    frame = self.sequencer.current_frame(),
                    "[TAS Playback] Ending TAS ..."
                );
                self.finalize(host);
            }
            return false;
        }

        if self.recorder.is_recording() {
            if buttons == self.triggers.stop_recording {
                if let Err(e) = self.stop_recording() {
                    tracing::error!(error = %e, "[TAS Recording] Failed to write recording");
                }
                return true;
            }
            return false;
        }

        if buttons == self.triggers.start_playback {
            if let Err(e) = self.start_playback(host) {
                tracing::debug!(error = %e, "[TAS Playback] Trigger ignored");
            }
        } else if buttons == self.triggers.start_recording {
            self.start_recording();
            return true;
        }
        false
    }

    /// Load the main script and start playing it
    ///
    /// Only starts from idle. A failed load leaves the engine idle.
    pub fn start_playback(
        &mut self,
        host: &mut dyn FrameRateHost,
    ) -> Result<PlaybackStart, LoadError> {
        if self.sequencer.is_active() {
            tracing::warn!(
                frame = self.sequencer.current_frame(),
                "[TAS Playback] Already playing, start ignored."
            );
            return Ok(PlaybackStart::AlreadyPlaying);
        }
        if self.recorder.is_recording() {
            tracing::warn!("[TAS Playback] Recording in progress, start cancelled.");
            return Ok(PlaybackStart::Recording);
        }

        tracing::info!(script = %self.config.main_script, "[TAS Playback] Starting TAS ...");
        self.tracker.clear();
        self.save_results = false;

        let loader = ScriptLoader::with_config(&self.storage, &self.config);
        let loaded = match loader.load(&self.config.main_script) {
            Ok(loaded) => loaded,
            Err(e) => {
                tracing::error!(error = %e, "[TAS Playback] Failed to load inputs, start cancelled.");
                return Err(e);
            }
        };

        self.diagnostics = loaded.diagnostics;
        self.save_results = loaded.save_results;
        self.sequencer.start(loaded.segments);

        if self.sequencer.phase() == PlaybackPhase::Completing {
            tracing::info!("[TAS Playback] No valid inputs, start cancelled.");
            self.finalize(host);
            return Ok(PlaybackStart::NoInputs);
        }

        tracing::info!(
            segments = self.sequencer.store().len(),
            frames = self.sequencer.store().frame_count(),
            "[TAS Playback] Inputs loaded!"
        );
        Ok(PlaybackStart::Started)
    }

    /// Stop playback early
    pub fn cancel_playback(&mut self, host: &mut dyn FrameRateHost) {
        if self.sequencer.is_active() {
            self.finalize(host);
        }
    }

    /// Start capturing live input
    ///
    /// Ignored while playback runs.
    pub fn start_recording(&mut self) -> bool {
        if self.sequencer.is_active() || self.recorder.is_recording() {
            return false;
        }
        tracing::info!("[TAS Recording] Starting recording ...");
        self.recorder.start();
        true
    }

    /// Stop capturing and write the recording as a script
    ///
    /// Returns the written file name, or `None` when not recording.
    pub fn stop_recording(&mut self) -> Result<Option<String>, StorageError> {
        if !self.recorder.is_recording() {
            return Ok(None);
        }
        let segments = self.recorder.stop();
        tracing::info!(
            segments = segments.len(),
            frames = segments.frame_count(),
            "[TAS Recording] Ending recording"
        );

        let now = chrono::Utc::now();
        let header = [
            format!("Recorded {}", now.to_rfc3339()),
            format!("{} frames", segments.frame_count()),
        ];
        let file_name = format!("{}{}", now.timestamp(), self.config.recording_extension);
        self.storage
            .write_output(&file_name, &write_script(&segments, &header))?;
        Ok(Some(file_name))
    }

    /// End the current run: write results if asked, reset, restore frame rate
    fn finalize(&mut self, host: &mut dyn FrameRateHost) {
        let log = self.tracker.finish();

        if self.save_results {
            let file_name = format!(
                "{}{}",
                chrono::Utc::now().timestamp(),
                self.config.results_extension
            );
            let written = log
                .to_json()
                .map_err(|e| e.to_string())
                .and_then(|json| {
                    self.storage
                        .write_output(&file_name, &json)
                        .map_err(|e| e.to_string())
                });
            match written {
                Ok(()) => tracing::info!(file = %file_name, "[TAS Playback] Saved results"),
                Err(error) => {
                    tracing::error!(%error, file = %file_name, "[TAS Playback] Failed to save results")
                }
            }
        }

        self.sequencer.reset();
        self.tracker.clear();
        self.save_results = false;
        host.set_frame_rate(self.config.default_frame_rate);
        tracing::info!("[TAS Playback] TAS complete.");
    }

    pub fn phase(&self) -> PlaybackPhase {
        self.sequencer.phase()
    }

    /// Frame the next poll will play (0 when idle)
    pub fn current_frame(&self) -> u64 {
        self.sequencer.current_frame()
    }

    pub fn segment_index(&self) -> usize {
        self.sequencer.segment_index()
    }

    /// Segments of the run in progress
    pub fn segments(&self) -> &SegmentStore {
        self.sequencer.store()
    }

    pub fn is_playing(&self) -> bool {
        self.sequencer.is_active()
    }

    pub fn is_recording(&self) -> bool {
        self.recorder.is_recording()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn config(&self) -> &TasConfig {
        &self.config
    }

    pub fn triggers(&self) -> Triggers {
        self.triggers
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }
}
