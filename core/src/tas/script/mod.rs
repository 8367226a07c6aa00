//! TAS script format (.jaktas)
//!
//! Plain text, one entry per line. Whitespace is ignored everywhere and `#`
//! starts a comment line.
//!
//! # Example Script
//!
//! ```text
//! # intro skip
//! frame-rate=30
//! skip-spool-movies=true
//! 120
//! 3, Square
//! 2, Circle, player-angle=90, player-speed=1
//! import=geyser-rock
//! ```
//!
//! # Lines
//!
//! - **Directives**: `import=`, `frame-rate=`, `marker=`, `save-results=`,
//!   `skip-spool-movies=`. Settings apply to the next input row and every row
//!   after it.
//! - **Input rows**: a frame count followed by button names and
//!   `player-angle=`, `player-speed=`, `camera-angle=`, `camera-zoom=`
//!   fields. Buttons last for the row only, axes carry forward.

mod ast;
mod loader;
mod parser;
mod validation;
mod writer;

pub use ast::{AXIS_KEYS, AxisKey, DIRECTIVE_KEYS, Directive, DirectiveKey, Line, RowField};
pub use loader::{DEFAULT_MAX_IMPORT_DEPTH, Diagnostic, LoadError, LoadedScript, ScriptLoader};
pub use parser::{COMMENT_PREFIX, ParseIssue, ParsedLine, parse_line};
pub use validation::{ValidationError, validate_segments};
pub use writer::write_script;
