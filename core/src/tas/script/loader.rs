//! Script loader
//!
//! Turns a script and everything it imports into a [`SegmentStore`].

use std::fmt;

use super::ast::{AxisKey, Directive, Line, RowField};
use super::parser::{ParseIssue, parse_line};
use crate::config::TasConfig;
use crate::tas::storage::ScriptStorage;
use crate::tas::store::SegmentStore;
use crate::tas::types::{DEFAULT_FRAME_RATE, Segment, SourceLocation};

/// Default cap on import nesting
pub const DEFAULT_MAX_IMPORT_DEPTH: usize = 32;

/// A warning attached to the line that caused it
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub source: SourceLocation,
    pub issue: ParseIssue,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.source, self.issue)
    }
}

/// Errors that abort a load
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LoadError {
    /// A script imports itself, directly or through other scripts
    #[error("import cycle at {location}: {}", .chain.join(" -> "))]
    ImportCycle {
        chain: Vec<String>,
        location: SourceLocation,
    },
    /// Imports nested deeper than the configured limit
    #[error("import of '{name}' at {location} exceeds the nesting limit of {limit}")]
    ImportDepthExceeded {
        name: String,
        limit: usize,
        location: SourceLocation,
    },
}

/// Everything produced by loading a script
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadedScript {
    pub segments: SegmentStore,
    /// Set by any `save-results=true` line
    pub save_results: bool,
    pub diagnostics: Vec<Diagnostic>,
}

/// Loads scripts through a storage backend
pub struct ScriptLoader<'a> {
    storage: &'a dyn ScriptStorage,
    main_script: String,
    default_frame_rate: u32,
    max_import_depth: usize,
}

impl<'a> ScriptLoader<'a> {
    /// Create a loader with default limits
    pub fn new(storage: &'a dyn ScriptStorage) -> Self {
        Self {
            storage,
            main_script: "main".to_string(),
            default_frame_rate: DEFAULT_FRAME_RATE,
            max_import_depth: DEFAULT_MAX_IMPORT_DEPTH,
        }
    }

    /// Create a loader using the limits from `config`
    pub fn with_config(storage: &'a dyn ScriptStorage, config: &TasConfig) -> Self {
        Self {
            storage,
            main_script: config.main_script.clone(),
            default_frame_rate: config.default_frame_rate,
            max_import_depth: config.max_import_depth,
        }
    }

    /// Load `name` and its imports, an empty name loads the main script
    ///
    /// Missing files and malformed lines only produce diagnostics; import
    /// cycles and excessive nesting fail the whole load.
    pub fn load(&self, name: &str) -> Result<LoadedScript, LoadError> {
        let name = if name.is_empty() {
            self.main_script.as_str()
        } else {
            name
        };
        let mut builder = SegmentBuilder::new(self.default_frame_rate);
        let mut active = Vec::new();
        self.load_into(name, None, &mut active, &mut builder)?;
        Ok(builder.finish())
    }

    fn load_into(
        &self,
        name: &str,
        imported_from: Option<&SourceLocation>,
        active: &mut Vec<String>,
        builder: &mut SegmentBuilder,
    ) -> Result<(), LoadError> {
        let origin = imported_from
            .cloned()
            .unwrap_or_else(|| SourceLocation::new(name, 0));

        if active.iter().any(|n| n == name) {
            let mut chain = active.clone();
            chain.push(name.to_string());
            return Err(LoadError::ImportCycle {
                chain,
                location: origin,
            });
        }
        if active.len() > self.max_import_depth {
            return Err(LoadError::ImportDepthExceeded {
                name: name.to_string(),
                limit: self.max_import_depth,
                location: origin,
            });
        }

        let contents = match self.storage.read_script(name) {
            Ok(contents) => contents,
            Err(e) => {
                if imported_from.is_none() {
                    tracing::error!(
                        "[TAS Input] Failed to open inputs. Make sure to create {} to get started!",
                        self.storage.script_location(name)
                    );
                } else {
                    tracing::error!(
                        "[TAS Input] Failed to open inputs. Import '{}' at {} not found, looking for {}",
                        name,
                        origin,
                        self.storage.script_location(name)
                    );
                }
                builder.diagnostics.push(Diagnostic {
                    source: origin,
                    issue: ParseIssue::ScriptNotFound {
                        name: name.to_string(),
                        reason: e.to_string(),
                    },
                });
                return Ok(());
            }
        };

        tracing::debug!(script = name, depth = active.len(), "[TAS Input] Reading script");
        active.push(name.to_string());

        for (index, raw) in contents.lines().enumerate() {
            let source = SourceLocation::new(name, index as u64 + 1);
            let parsed = parse_line(raw);

            for issue in parsed.issues {
                builder.warn(source.clone(), issue);
            }

            match parsed.line {
                None | Some(Line::Blank) => {}
                Some(Line::Directive(Directive::Import(import))) => {
                    self.load_into(&import, Some(&source), active, builder)?;
                }
                Some(Line::Directive(directive)) => builder.apply_directive(directive, source),
                Some(Line::Row { frames, fields }) => builder.apply_row(frames, fields, source),
            }
        }

        active.pop();
        Ok(())
    }
}

/// Accumulates segments across a script and its imports
struct SegmentBuilder {
    store: SegmentStore,
    // Segment still receiving lines, not yet in the store
    current: Option<Segment>,
    // Previous row consumed frames, so the next change opens a new segment
    last_row_had_frame_data: bool,
    save_results: bool,
    diagnostics: Vec<Diagnostic>,
    default_frame_rate: u32,
}

impl SegmentBuilder {
    fn new(default_frame_rate: u32) -> Self {
        Self {
            store: SegmentStore::new(),
            current: None,
            last_row_had_frame_data: false,
            save_results: false,
            diagnostics: Vec::new(),
            default_frame_rate,
        }
    }

    fn warn(&mut self, source: SourceLocation, issue: ParseIssue) {
        tracing::warn!("[TAS Input] {}: {}", source, issue);
        self.diagnostics.push(Diagnostic { source, issue });
    }

    /// The segment the current line writes into
    fn pending(&mut self, source: SourceLocation) -> &mut Segment {
        if self.last_row_had_frame_data {
            self.last_row_had_frame_data = false;
            if let Some(done) = self.current.take() {
                let next = done.successor(source.clone());
                self.store.push(done);
                self.current = Some(next);
            }
        }

        let default_frame_rate = self.default_frame_rate;
        self.current.get_or_insert_with(|| {
            let mut first = Segment::new(1, source);
            first.frame_rate = default_frame_rate;
            first
        })
    }

    fn apply_directive(&mut self, directive: Directive, source: SourceLocation) {
        match directive {
            Directive::FrameRate(rate) => self.pending(source).frame_rate = rate,
            Directive::Marker(marker) => self.pending(source).marker = Some(marker),
            Directive::SkipSpoolMovies(skip) => self.pending(source).skip_spool_movies = skip,
            Directive::SaveResults(save) => self.save_results = save,
            // Imports are expanded by the loader
            Directive::Import(_) => {}
        }
    }

    fn apply_row(&mut self, frames: u64, fields: Vec<RowField>, source: SourceLocation) {
        // Zero-frame rows leave pending state untouched
        if frames == 0 {
            return;
        }

        let segment = self.pending(source.clone());
        // u64::MAX is reserved so the next segment still has a first frame
        let Some(last_frame) = segment
            .last_frame
            .checked_add(frames)
            .filter(|last| *last < u64::MAX)
        else {
            self.warn(
                source,
                ParseIssue::MalformedFrameCount {
                    text: frames.to_string(),
                },
            );
            return;
        };
        segment.last_frame = last_frame;

        for field in fields {
            match field {
                RowField::Button(button) => segment.buttons |= button,
                RowField::Axis(AxisKey::PlayerAngle, value) => segment.player_angle = value,
                RowField::Axis(AxisKey::PlayerSpeed, value) => segment.player_speed = value,
                RowField::Axis(AxisKey::CameraAngle, value) => segment.camera_angle = value,
                RowField::Axis(AxisKey::CameraZoom, value) => segment.camera_zoom = value,
            }
        }

        self.last_row_had_frame_data = true;
    }

    fn finish(mut self) -> LoadedScript {
        if let Some(last) = self.current.take() {
            self.store.push(last);
        }
        self.store.prune_empty();
        LoadedScript {
            segments: self.store,
            save_results: self.save_results,
            diagnostics: self.diagnostics,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tas::storage::MemoryStorage;
    use crate::tas::types::Buttons;

    fn load(storage: &MemoryStorage) -> LoadedScript {
        ScriptLoader::new(storage).load("main").unwrap()
    }

    fn main_script(contents: &str) -> MemoryStorage {
        MemoryStorage::new().with_script("main", contents)
    }

    #[test]
    fn test_two_rows() {
        let loaded = load(&main_script("3,Square\n2,Circle,player-angle=90\n"));
        let segments = loaded.segments.as_slice();

        assert_eq!(segments.len(), 2);
        assert_eq!((segments[0].first_frame, segments[0].last_frame), (1, 3));
        assert_eq!(segments[0].buttons, Buttons::SQUARE);
        assert_eq!(segments[0].player_angle, 0.0);
        assert_eq!((segments[1].first_frame, segments[1].last_frame), (4, 5));
        assert_eq!(segments[1].buttons, Buttons::CIRCLE);
        assert_eq!(segments[1].player_angle, 90.0);
        assert!(loaded.diagnostics.is_empty());
    }

    #[test]
    fn test_axes_carry_forward_buttons_do_not() {
        let loaded = load(&main_script("2,X,player-angle=90,camera-zoom=2\n4\n1,Square,camera-zoom=1"));
        let segments = loaded.segments.as_slice();

        assert_eq!(segments[1].buttons, Buttons::empty());
        assert_eq!(segments[1].player_angle, 90.0);
        assert_eq!(segments[1].camera_zoom, 2.0);
        assert_eq!(segments[2].player_angle, 90.0);
        assert_eq!(segments[2].camera_zoom, 1.0);
    }

    #[test]
    fn test_leading_directive() {
        let loaded = load(&main_script("frame-rate=30\n5,X\n"));
        let segments = loaded.segments.as_slice();

        assert_eq!(segments.len(), 1);
        assert_eq!((segments[0].first_frame, segments[0].last_frame), (1, 5));
        assert_eq!(segments[0].frame_rate, 30);
        assert_eq!(segments[0].buttons, Buttons::X);
        assert_eq!(segments[0].source, SourceLocation::new("main", 1));
    }

    #[test]
    fn test_directive_applies_forward_only() {
        let loaded = load(&main_script(
            "2,X\nframe-rate=30\nskip-spool-movies=true\n3,Circle\n1,Square\nframe-rate=60\n1\n",
        ));
        let segments = loaded.segments.as_slice();

        assert_eq!(segments.len(), 4);
        assert_eq!(segments[0].frame_rate, 60);
        assert!(!segments[0].skip_spool_movies);
        assert_eq!(segments[1].frame_rate, 30);
        assert!(segments[1].skip_spool_movies);
        assert_eq!((segments[1].first_frame, segments[1].last_frame), (3, 5));
        assert_eq!(segments[2].frame_rate, 30);
        assert!(segments[2].skip_spool_movies);
        assert_eq!(segments[3].frame_rate, 60);
        assert!(segments[3].skip_spool_movies);
    }

    #[test]
    fn test_zero_frame_row_keeps_pending_directive() {
        let loaded = load(&main_script("2,X\nframe-rate=30\n0,Square\n3,Circle\n"));
        let segments = loaded.segments.as_slice();

        assert_eq!(segments.len(), 2);
        assert_eq!(segments[1].frame_rate, 30);
        assert_eq!(segments[1].buttons, Buttons::CIRCLE);
        assert_eq!((segments[1].first_frame, segments[1].last_frame), (3, 5));
    }

    #[test]
    fn test_markers_inherit() {
        let loaded = load(&main_script("marker=intro\n2\n3,X\nmarker=boss\n1\n"));
        let markers: Vec<_> = loaded
            .segments
            .iter()
            .map(|s| s.marker.as_deref())
            .collect();
        assert_eq!(markers, vec![Some("intro"), Some("intro"), Some("boss")]);
    }

    #[test]
    fn test_trailing_directive_is_dropped() {
        let loaded = load(&main_script("2,X\nframe-rate=30\n"));
        assert_eq!(loaded.segments.len(), 1);
        assert_eq!(loaded.segments.frame_count(), 2);
    }

    #[test]
    fn test_save_results_flag() {
        assert!(load(&main_script("save-results=true\n1\n")).save_results);
        assert!(!load(&main_script("save-results=true\nsave-results=false\n1\n")).save_results);
        assert!(!load(&main_script("1\n")).save_results);
    }

    #[test]
    fn test_malformed_lines_are_skipped() {
        let loaded = load(&main_script(
            "2,X\nthree,Square\nframe-rate=fast\n1,Circle,Jump\n",
        ));
        let segments = loaded.segments.as_slice();

        assert_eq!(segments.len(), 2);
        assert_eq!(segments[1].frame_rate, 60);
        assert_eq!(segments[1].buttons, Buttons::CIRCLE);
        assert_eq!(loaded.diagnostics.len(), 3);
        assert_eq!(loaded.diagnostics[0].source, SourceLocation::new("main", 2));
        assert_eq!(
            loaded.diagnostics[2].issue,
            ParseIssue::UnknownField {
                field: "Jump".to_string()
            }
        );
    }

    #[test]
    fn test_huge_frame_count_is_reported() {
        let loaded = load(&main_script("18446744073709551615,X\n1,Circle\n"));
        let segments = loaded.segments.as_slice();

        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].buttons, Buttons::CIRCLE);
        assert_eq!((segments[0].first_frame, segments[0].last_frame), (1, 1));
        assert_eq!(loaded.diagnostics.len(), 1);
        assert!(matches!(
            loaded.diagnostics[0].issue,
            ParseIssue::MalformedFrameCount { .. }
        ));

        // Running total would land on u64::MAX
        let loaded = load(&main_script("2,X\n18446744073709551613,Square\n"));
        assert_eq!(loaded.segments.frame_count(), 2);
        assert_eq!(loaded.diagnostics.len(), 1);
    }

    #[test]
    fn test_import_splices_segments() {
        let storage = MemoryStorage::new()
            .with_script("main", "2,X\nimport=foo\n1,Square\n")
            .with_script("foo", "frame-rate=30\n3,Circle\n# done\n4,Up\n");
        let loaded = load(&storage);
        let segments = loaded.segments.as_slice();

        let ranges: Vec<_> = segments
            .iter()
            .map(|s| (s.first_frame, s.last_frame))
            .collect();
        assert_eq!(ranges, vec![(1, 2), (3, 5), (6, 9), (10, 10)]);
        assert_eq!(segments[1].source, SourceLocation::new("foo", 1));
        assert_eq!(segments[1].frame_rate, 30);
        assert_eq!(segments[3].buttons, Buttons::SQUARE);
        assert_eq!(segments[3].frame_rate, 30);
    }

    #[test]
    fn test_same_script_imported_twice() {
        let storage = MemoryStorage::new()
            .with_script("main", "import=step\nimport=step\n")
            .with_script("step", "1,X\n");
        let loaded = load(&storage);
        assert_eq!(loaded.segments.len(), 2);
        assert_eq!(loaded.segments.frame_count(), 2);
    }

    #[test]
    fn test_missing_import_contributes_nothing() {
        let storage = MemoryStorage::new().with_script("main", "1,X\nimport=nope\n2,Circle\n");
        let loaded = load(&storage);

        assert_eq!(loaded.segments.len(), 2);
        assert_eq!(loaded.diagnostics.len(), 1);
        assert_eq!(loaded.diagnostics[0].source, SourceLocation::new("main", 2));
        assert!(matches!(
            loaded.diagnostics[0].issue,
            ParseIssue::ScriptNotFound { ref name, .. } if name == "nope"
        ));
    }

    #[test]
    fn test_missing_main_script() {
        let loaded = load(&MemoryStorage::new());
        assert!(loaded.segments.is_empty());
        assert_eq!(loaded.diagnostics.len(), 1);
    }

    #[test]
    fn test_import_cycle_is_an_error() {
        let storage = MemoryStorage::new()
            .with_script("main", "1,X\nimport=a\n")
            .with_script("a", "import=b\n")
            .with_script("b", "1\nimport=a\n");
        let error = ScriptLoader::new(&storage).load("main").unwrap_err();

        assert_eq!(
            error,
            LoadError::ImportCycle {
                chain: vec![
                    "main".to_string(),
                    "a".to_string(),
                    "b".to_string(),
                    "a".to_string()
                ],
                location: SourceLocation::new("b", 2),
            }
        );
    }

    #[test]
    fn test_import_depth_limit() {
        let mut storage = MemoryStorage::new().with_script("main", "import=s0\n");
        for depth in 0..5 {
            storage.insert_script(&format!("s{depth}"), &format!("1\nimport=s{}\n", depth + 1));
        }
        storage.insert_script("s5", "1\n");

        let config = TasConfig {
            max_import_depth: 3,
            ..Default::default()
        };
        let error = ScriptLoader::with_config(&storage, &config)
            .load("main")
            .unwrap_err();
        assert!(matches!(
            error,
            LoadError::ImportDepthExceeded { ref name, limit: 3, .. } if name == "s3"
        ));

        let config = TasConfig {
            max_import_depth: 6,
            ..Default::default()
        };
        let loaded = ScriptLoader::with_config(&storage, &config)
            .load("main")
            .unwrap();
        assert_eq!(loaded.segments.frame_count(), 6);
    }

    #[test]
    fn test_empty_name_loads_main_script() {
        let storage = main_script("4,X\n").with_script("speedrun", "1\n");
        assert_eq!(ScriptLoader::new(&storage).load("").unwrap().segments.frame_count(), 4);

        let config = TasConfig {
            main_script: "speedrun".to_string(),
            ..Default::default()
        };
        let loaded = ScriptLoader::with_config(&storage, &config).load("").unwrap();
        assert_eq!(loaded.segments.frame_count(), 1);
    }

    #[test]
    fn test_default_frame_rate_from_config() {
        let storage = main_script("1\n");
        let config = TasConfig {
            default_frame_rate: 50,
            ..Default::default()
        };
        let loaded = ScriptLoader::with_config(&storage, &config)
            .load("main")
            .unwrap();
        assert_eq!(loaded.segments.as_slice()[0].frame_rate, 50);
    }
}
