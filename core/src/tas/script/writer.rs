//! Script writer
//!
//! Converts segments back into script text. Used for recordings.

use std::fmt::Write;

use super::ast::AxisKey;
use super::parser::COMMENT_PREFIX;
use crate::tas::types::Segment;

/// Render segments as a script
///
/// Each header line becomes a comment. Buttons are written on every row, axes
/// only when they differ from the previous row (all four on the first row).
/// Axis values must be finite for the output to load again.
pub fn write_script<'a>(
    segments: impl IntoIterator<Item = &'a Segment>,
    header: &[String],
) -> String {
    let mut out = String::new();
    for line in header {
        let _ = writeln!(out, "{COMMENT_PREFIX} {line}");
    }

    let mut previous: Option<[f32; 4]> = None;
    for segment in segments {
        let axes = axis_values(segment);
        let _ = write!(out, "{}", segment.frame_count());

        for name in segment.buttons.names() {
            let _ = write!(out, ",{name}");
        }

        for (index, (key, value)) in axes.iter().enumerate() {
            let changed = previous.is_none_or(|prev| prev[index] != *value);
            if changed {
                let _ = write!(out, ",{key}={value}");
            }
        }

        out.push('\n');
        previous = Some(axes.map(|(_, value)| value));
    }

    out
}

fn axis_values(segment: &Segment) -> [(AxisKey, f32); 4] {
    [
        (AxisKey::PlayerAngle, segment.player_angle),
        (AxisKey::PlayerSpeed, segment.player_speed),
        (AxisKey::CameraAngle, segment.camera_angle),
        (AxisKey::CameraZoom, segment.camera_zoom),
    ]
}
