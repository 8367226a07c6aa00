//! Playback sequencer
//!
//! Walks a segment store one logical frame per tick.

use crate::tas::store::SegmentStore;
use crate::tas::types::InputFrame;

/// The game's frame rate control
pub trait FrameRateHost {
    fn frame_rate(&self) -> u32;
    fn set_frame_rate(&mut self, rate: u32);
}

/// Playback state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackPhase {
    #[default]
    Idle,
    /// Producing input frames
    Running,
    /// Every frame has been handed out, waiting to be finalized
    Completing,
}

/// Playback cursor over a segment store
#[derive(Debug, Clone, Default)]
pub struct Sequencer {
    store: SegmentStore,
    phase: PlaybackPhase,
    current_frame: u64,
    segment_index: usize,
}

impl Sequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin playing `store` from frame 1
    ///
    /// An empty store goes straight to [`PlaybackPhase::Completing`].
    pub fn start(&mut self, store: SegmentStore) {
        if store.is_empty() {
            self.store = store;
            self.phase = PlaybackPhase::Completing;
            self.current_frame = 0;
            self.segment_index = 0;
            return;
        }
        self.store = store;
        self.phase = PlaybackPhase::Running;
        self.current_frame = 1;
        self.segment_index = 0;
    }

    /// Produce the next frame, if running
    ///
    /// Applies the segment's frame rate on its first frame.
    pub fn tick(&mut self, host: &mut dyn FrameRateHost) -> Option<InputFrame> {
        if self.phase != PlaybackPhase::Running {
            return None;
        }
        let Some(segment) = self.store.get(self.segment_index) else {
            self.phase = PlaybackPhase::Completing;
            return None;
        };

        let frame = InputFrame::from_segment(self.current_frame, segment);

        if self.current_frame == segment.first_frame && host.frame_rate() != segment.frame_rate {
            tracing::debug!(
                frame = self.current_frame,
                rate = segment.frame_rate,
                "[TAS Playback] Changing frame rate"
            );
            host.set_frame_rate(segment.frame_rate);
        }

        if self.current_frame == segment.last_frame {
            self.segment_index += 1;
        }
        self.current_frame += 1;

        if self.segment_index >= self.store.len() {
            self.phase = PlaybackPhase::Completing;
        }

        Some(frame)
    }

    /// Back to idle with nothing loaded
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn phase(&self) -> PlaybackPhase {
        self.phase
    }

    /// Running or completing
    pub fn is_active(&self) -> bool {
        self.phase != PlaybackPhase::Idle
    }

    /// Frame the next tick will produce (0 when idle)
    pub fn current_frame(&self) -> u64 {
        self.current_frame
    }

    pub fn segment_index(&self) -> usize {
        self.segment_index
    }

    pub fn store(&self) -> &SegmentStore {
        &self.store
    }
}
