//! Input recorder
//!
//! Captures live controller input as run-length segments.

use crate::tas::store::SegmentStore;
use crate::tas::types::{ControllerFrame, Segment, SourceLocation};

/// Source name given to recorded segments
pub const RECORDING_SOURCE: &str = "recording";

/// Input recorder state
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    segments: Vec<Segment>,
    recording: bool,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start recording, discarding anything captured before
    pub fn start(&mut self) {
        self.recording = true;
        self.segments.clear();
    }

    /// Stop recording and hand over the captured segments
    pub fn stop(&mut self) -> SegmentStore {
        self.recording = false;
        SegmentStore::from(std::mem::take(&mut self.segments))
    }

    /// Check if recording is active
    pub fn is_recording(&self) -> bool {
        self.recording
    }

    /// Record one frame of input
    ///
    /// Extends the last segment when the input is unchanged. Non-finite axes
    /// are stored as 0 since scripts cannot express them.
    pub fn record(&mut self, input: &ControllerFrame) {
        if !self.recording {
            return;
        }
        let input = &finite_axes(input);

        if let Some(last) = self.segments.last_mut()
            && last.controller() == *input
        {
            last.last_frame += 1;
            return;
        }

        let frame = self.segments.last().map_or(1, |s| s.last_frame + 1);
        let mut segment = Segment::new(frame, SourceLocation::new(RECORDING_SOURCE, frame));
        segment.last_frame = frame;
        segment.buttons = input.buttons;
        segment.player_angle = input.player_angle;
        segment.player_speed = input.player_speed;
        segment.camera_angle = input.camera_angle;
        segment.camera_zoom = input.camera_zoom;
        self.segments.push(segment);
    }

    /// Frames captured so far
    pub fn frame_count(&self) -> u64 {
        self.segments.last().map_or(0, |s| s.last_frame)
    }

    /// Record a whole sequence of frames
    pub fn record_all<'a>(frames: impl IntoIterator<Item = &'a ControllerFrame>) -> SegmentStore {
        let mut recorder = Self::new();
        recorder.start();
        for frame in frames {
            recorder.record(frame);
        }
        recorder.stop()
    }
}

fn finite_axes(input: &ControllerFrame) -> ControllerFrame {
    let finite = |value: f32| if value.is_finite() { value } else { 0.0 };
    ControllerFrame {
        buttons: input.buttons,
        player_angle: finite(input.player_angle),
        player_speed: finite(input.player_speed),
        camera_angle: finite(input.camera_angle),
        camera_zoom: finite(input.camera_zoom),
    }
}
