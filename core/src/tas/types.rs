//! Core types for the TAS engine
//!
//! This module defines the data structures shared by the script parser, the
//! playback sequencer, the recorder and the result tracker.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Frame rate used whenever no playback is driving the game.
pub const DEFAULT_FRAME_RATE: u32 = 60;

bitflags::bitflags! {
    /// Logical controller buttons held during a frame
    ///
    /// Bit positions match the pad's `button0` word.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Buttons: u16 {
        const SELECT = 1 << 0;
        const L3 = 1 << 1;
        const R3 = 1 << 2;
        const START = 1 << 3;
        const UP = 1 << 4;
        const RIGHT = 1 << 5;
        const DOWN = 1 << 6;
        const LEFT = 1 << 7;
        const L2 = 1 << 8;
        const R2 = 1 << 9;
        const L1 = 1 << 10;
        const R1 = 1 << 11;
        const TRIANGLE = 1 << 12;
        const CIRCLE = 1 << 13;
        const X = 1 << 14;
        const SQUARE = 1 << 15;
    }
}

/// Script names for every button, in bit order
pub const BUTTON_NAMES: [(&str, Buttons); 16] = [
    ("Select", Buttons::SELECT),
    ("L3", Buttons::L3),
    ("R3", Buttons::R3),
    ("Start", Buttons::START),
    ("Up", Buttons::UP),
    ("Right", Buttons::RIGHT),
    ("Down", Buttons::DOWN),
    ("Left", Buttons::LEFT),
    ("L2", Buttons::L2),
    ("R2", Buttons::R2),
    ("L1", Buttons::L1),
    ("R1", Buttons::R1),
    ("Triangle", Buttons::TRIANGLE),
    ("Circle", Buttons::CIRCLE),
    ("X", Buttons::X),
    ("Square", Buttons::SQUARE),
];

impl Buttons {
    /// Look up a single button by its script name (case-sensitive)
    pub fn from_script_name(name: &str) -> Option<Self> {
        BUTTON_NAMES
            .iter()
            .find(|(button_name, _)| *button_name == name)
            .map(|(_, button)| *button)
    }

    /// Parse a combo such as `"L1+R1"`
    ///
    /// Returns the first unknown name on failure.
    pub fn parse_combo(combo: &str) -> Result<Self, String> {
        let mut buttons = Buttons::empty();
        for name in combo.split('+').map(str::trim).filter(|n| !n.is_empty()) {
            buttons |= Self::from_script_name(name).ok_or_else(|| name.to_string())?;
        }
        Ok(buttons)
    }

    /// Script names of the held buttons, in bit order
    pub fn names(self) -> impl Iterator<Item = &'static str> {
        BUTTON_NAMES
            .iter()
            .filter(move |(_, button)| self.contains(*button))
            .map(|(name, _)| *name)
    }
}

impl fmt::Display for Buttons {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "none");
        }
        let names: Vec<_> = self.names().collect();
        write!(f, "{}", names.join("+"))
    }
}

// Buttons serialize as the raw button0 word
impl Serialize for Buttons {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.bits().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Buttons {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let bits = u16::deserialize(deserializer)?;
        Ok(Buttons::from_bits_truncate(bits))
    }
}

/// Where a segment came from
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SourceLocation {
    /// Script name (without folder or extension)
    pub file: String,
    /// 1-based line number
    pub line: u64,
}

impl SourceLocation {
    pub fn new(file: impl Into<String>, line: u64) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// Live controller state for one frame
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ControllerFrame {
    #[serde(default)]
    pub buttons: Buttons,
    #[serde(default)]
    pub player_angle: f32,
    #[serde(default)]
    pub player_speed: f32,
    #[serde(default)]
    pub camera_angle: f32,
    #[serde(default)]
    pub camera_zoom: f32,
}

impl ControllerFrame {
    /// Controller frame with only buttons held
    pub fn from_buttons(buttons: Buttons) -> Self {
        Self {
            buttons,
            ..Default::default()
        }
    }
}

/// One run of identical input across consecutive logical frames
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// First logical frame (inclusive)
    pub first_frame: u64,
    /// Last logical frame (inclusive)
    pub last_frame: u64,
    /// Originating script line
    pub source: SourceLocation,

    // Settings applied on the first frame of the segment
    pub frame_rate: u32,
    pub skip_spool_movies: bool,
    pub marker: Option<String>,

    // Inputs held for the whole segment
    pub buttons: Buttons,
    pub player_angle: f32,
    pub player_speed: f32,
    pub camera_angle: f32,
    pub camera_zoom: f32,
}

impl Segment {
    /// An empty segment starting at `first_frame` with default settings
    pub fn new(first_frame: u64, source: SourceLocation) -> Self {
        Self {
            first_frame,
            last_frame: first_frame.saturating_sub(1),
            source,
            frame_rate: DEFAULT_FRAME_RATE,
            skip_spool_movies: false,
            marker: None,
            buttons: Buttons::empty(),
            player_angle: 0.0,
            player_speed: 0.0,
            camera_angle: 0.0,
            camera_zoom: 0.0,
        }
    }

    /// The empty segment that follows this one
    ///
    /// Settings and axes carry over, buttons do not.
    pub fn successor(&self, source: SourceLocation) -> Self {
        Self {
            first_frame: self.last_frame.saturating_add(1),
            last_frame: self.last_frame,
            source,
            frame_rate: self.frame_rate,
            skip_spool_movies: self.skip_spool_movies,
            marker: self.marker.clone(),
            buttons: Buttons::empty(),
            player_angle: self.player_angle,
            player_speed: self.player_speed,
            camera_angle: self.camera_angle,
            camera_zoom: self.camera_zoom,
        }
    }

    /// Number of frames covered
    pub fn frame_count(&self) -> u64 {
        if self.last_frame < self.first_frame {
            return 0;
        }
        (self.last_frame - self.first_frame).saturating_add(1)
    }

    pub fn is_empty(&self) -> bool {
        self.frame_count() == 0
    }

    pub fn contains_frame(&self, frame: u64) -> bool {
        frame >= self.first_frame && frame <= self.last_frame
    }

    /// The controller input held during this segment
    pub fn controller(&self) -> ControllerFrame {
        ControllerFrame {
            buttons: self.buttons,
            player_angle: self.player_angle,
            player_speed: self.player_speed,
            camera_angle: self.camera_angle,
            camera_zoom: self.camera_zoom,
        }
    }
}

/// Input frame handed to the game each tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputFrame {
    /// Logical frame being played, 0 when no playback is active
    pub tas_frame: u64,
    pub frame_rate: u32,
    pub skip_spool_movies: bool,
    pub is_recording_input: bool,
    pub buttons: Buttons,
    pub player_angle: f32,
    pub player_speed: f32,
    pub camera_angle: f32,
    pub camera_zoom: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker: Option<String>,
}

impl InputFrame {
    /// Output when no playback is running
    pub fn idle(is_recording_input: bool) -> Self {
        Self {
            tas_frame: 0,
            frame_rate: DEFAULT_FRAME_RATE,
            skip_spool_movies: false,
            is_recording_input,
            buttons: Buttons::empty(),
            player_angle: 0.0,
            player_speed: 0.0,
            camera_angle: 0.0,
            camera_zoom: 0.0,
            marker: None,
        }
    }

    /// Output for `frame` while playing `segment`
    pub fn from_segment(frame: u64, segment: &Segment) -> Self {
        Self {
            tas_frame: frame,
            frame_rate: segment.frame_rate,
            skip_spool_movies: segment.skip_spool_movies,
            // Playback never records
            is_recording_input: false,
            buttons: segment.buttons,
            player_angle: segment.player_angle,
            player_speed: segment.player_speed,
            camera_angle: segment.camera_angle,
            camera_zoom: segment.camera_zoom,
            marker: segment.marker.clone(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.tas_frame > 0
    }

    /// The controller portion of this frame
    pub fn controller(&self) -> ControllerFrame {
        ControllerFrame {
            buttons: self.buttons,
            player_angle: self.player_angle,
            player_speed: self.player_speed,
            camera_angle: self.camera_angle,
            camera_zoom: self.camera_zoom,
        }
    }
}

/// Four component vector reported by the game
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec4 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

/// Per-frame outcome reported by the game after it consumed an input frame
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct FrameResults {
    pub tas_frame: u64,
    pub fuel_cell_total: f32,
    pub money_total: f32,
    pub buzzer_total: f32,
    /// Input the game actually consumed this frame
    pub input_buttons: Buttons,
    pub input_player_angle: f32,
    pub input_player_speed: f32,
    pub input_camera_angle: f32,
    pub input_camera_zoom: f32,
    pub player_position: Vec4,
    pub camera_position: Vec4,
}

impl FrameResults {
    /// Whether collectible counters differ
    pub fn collectables_changed(&self, other: &FrameResults) -> bool {
        self.fuel_cell_total != other.fuel_cell_total
            || self.money_total != other.money_total
            || self.buzzer_total != other.buzzer_total
    }

    /// Whether anything tracked (counters or positions) differs
    pub fn snapshot_changed(&self, other: &FrameResults) -> bool {
        self.collectables_changed(other)
            || self.player_position != other.player_position
            || self.camera_position != other.camera_position
    }
}
