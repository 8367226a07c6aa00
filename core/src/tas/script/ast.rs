//! Script line types.

use std::fmt;

use crate::tas::types::Buttons;

/// Directive keys in matching priority order
pub const DIRECTIVE_KEYS: [DirectiveKey; 5] = [
    DirectiveKey::Import,
    DirectiveKey::FrameRate,
    DirectiveKey::Marker,
    DirectiveKey::SaveResults,
    DirectiveKey::SkipSpoolMovies,
];

/// Axis field keys in matching order
pub const AXIS_KEYS: [AxisKey; 4] = [
    AxisKey::PlayerAngle,
    AxisKey::PlayerSpeed,
    AxisKey::CameraAngle,
    AxisKey::CameraZoom,
];

/// Recognized directive keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectiveKey {
    Import,
    FrameRate,
    Marker,
    SaveResults,
    SkipSpoolMovies,
}

impl DirectiveKey {
    pub fn as_str(self) -> &'static str {
        match self {
            DirectiveKey::Import => "import",
            DirectiveKey::FrameRate => "frame-rate",
            DirectiveKey::Marker => "marker",
            DirectiveKey::SaveResults => "save-results",
            DirectiveKey::SkipSpoolMovies => "skip-spool-movies",
        }
    }
}

impl fmt::Display for DirectiveKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Analog axis keys usable in input rows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisKey {
    PlayerAngle,
    PlayerSpeed,
    CameraAngle,
    CameraZoom,
}

impl AxisKey {
    pub fn as_str(self) -> &'static str {
        match self {
            AxisKey::PlayerAngle => "player-angle",
            AxisKey::PlayerSpeed => "player-speed",
            AxisKey::CameraAngle => "camera-angle",
            AxisKey::CameraZoom => "camera-zoom",
        }
    }
}

impl fmt::Display for AxisKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A directive with its parsed value
#[derive(Debug, Clone, PartialEq)]
pub enum Directive {
    Import(String),
    FrameRate(u32),
    Marker(String),
    SaveResults(bool),
    SkipSpoolMovies(bool),
}

/// One comma-separated field after the frame count
#[derive(Debug, Clone, PartialEq)]
pub enum RowField {
    Button(Buttons),
    Axis(AxisKey, f32),
}

/// Classified script line
#[derive(Debug, Clone, PartialEq)]
pub enum Line {
    /// Empty or comment
    Blank,
    Directive(Directive),
    /// Input row; `fields` holds only the fields that parsed
    Row { frames: u64, fields: Vec<RowField> },
}
