//! Configuration management (`tas.toml`)
//!
//! Handles loading, saving, and providing defaults for the TAS engine
//! settings. Every field has a default so partial files are fine.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::tas::types::{Buttons, DEFAULT_FRAME_RATE};

/// Name of the configuration file inside the config directory
pub const CONFIG_FILE_NAME: &str = "tas.toml";

/// Configuration errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// A trigger combo names a button that doesn't exist
    #[error("trigger {trigger}: unknown button '{button}'")]
    UnknownButton { trigger: String, button: String },
    /// A trigger combo holds no buttons
    #[error("trigger {0} has no buttons")]
    EmptyTrigger(String),
}

/// TAS engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TasConfig {
    /// Folder holding scripts and output files (default: `tas/jak1`)
    #[serde(default = "default_folder")]
    pub folder: PathBuf,
    /// Script loaded when playback starts (default: `main`)
    #[serde(default = "default_main_script")]
    pub main_script: String,
    /// Script file extension (default: `.jaktas`)
    #[serde(default = "default_script_extension")]
    pub script_extension: String,
    /// Suffix for recorded scripts (default: `.recording.jaktas`)
    #[serde(default = "default_recording_extension")]
    pub recording_extension: String,
    /// Suffix for results logs (default: `.automated.results.json`)
    #[serde(default = "default_results_extension")]
    pub results_extension: String,
    /// Frame rate restored when playback ends (default: 60)
    #[serde(default = "default_frame_rate")]
    pub default_frame_rate: u32,
    /// Deepest allowed import nesting (default: 32)
    #[serde(default = "default_max_import_depth")]
    pub max_import_depth: usize,
    /// Controller combos that drive the engine
    #[serde(default)]
    pub triggers: TriggerConfig,
}

/// Button combos, written like `"L1+R1"`.
///
/// A combo fires when it becomes exactly the set of held buttons.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerConfig {
    /// Start playback of the main script (default: L3)
    #[serde(default = "default_start_playback")]
    pub start_playback: String,
    /// Cancel a running playback (default: Triangle)
    #[serde(default = "default_cancel_playback")]
    pub cancel_playback: String,
    /// Start recording live input (default: L2)
    #[serde(default = "default_start_recording")]
    pub start_recording: String,
    /// Stop recording and write the script (default: R2)
    #[serde(default = "default_stop_recording")]
    pub stop_recording: String,
}

/// Resolved trigger combos
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Triggers {
    pub start_playback: Buttons,
    pub cancel_playback: Buttons,
    pub start_recording: Buttons,
    pub stop_recording: Buttons,
}

fn default_folder() -> PathBuf {
    PathBuf::from("tas/jak1")
}
fn default_main_script() -> String {
    "main".to_string()
}
fn default_script_extension() -> String {
    ".jaktas".to_string()
}
fn default_recording_extension() -> String {
    ".recording.jaktas".to_string()
}
fn default_results_extension() -> String {
    ".automated.results.json".to_string()
}
fn default_frame_rate() -> u32 {
    DEFAULT_FRAME_RATE
}
fn default_max_import_depth() -> usize {
    32
}

fn default_start_playback() -> String {
    "L3".to_string()
}
fn default_cancel_playback() -> String {
    "Triangle".to_string()
}
fn default_start_recording() -> String {
    "L2".to_string()
}
fn default_stop_recording() -> String {
    "R2".to_string()
}

impl Default for TasConfig {
    fn default() -> Self {
        Self {
            folder: default_folder(),
            main_script: default_main_script(),
            script_extension: default_script_extension(),
            recording_extension: default_recording_extension(),
            results_extension: default_results_extension(),
            default_frame_rate: default_frame_rate(),
            max_import_depth: default_max_import_depth(),
            triggers: TriggerConfig::default(),
        }
    }
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            start_playback: default_start_playback(),
            cancel_playback: default_cancel_playback(),
            start_recording: default_start_recording(),
            stop_recording: default_stop_recording(),
        }
    }
}

impl TriggerConfig {
    /// Resolve combo strings into button masks
    pub fn resolve(&self) -> Result<Triggers, ConfigError> {
        Ok(Triggers {
            start_playback: resolve_combo("start_playback", &self.start_playback)?,
            cancel_playback: resolve_combo("cancel_playback", &self.cancel_playback)?,
            start_recording: resolve_combo("start_recording", &self.start_recording)?,
            stop_recording: resolve_combo("stop_recording", &self.stop_recording)?,
        })
    }
}

impl Default for Triggers {
    fn default() -> Self {
        Self {
            start_playback: Buttons::L3,
            cancel_playback: Buttons::TRIANGLE,
            start_recording: Buttons::L2,
            stop_recording: Buttons::R2,
        }
    }
}

fn resolve_combo(trigger: &str, combo: &str) -> Result<Buttons, ConfigError> {
    let buttons = Buttons::parse_combo(combo).map_err(|button| ConfigError::UnknownButton {
        trigger: trigger.to_string(),
        button,
    })?;
    if buttons.is_empty() {
        return Err(ConfigError::EmptyTrigger(trigger.to_string()));
    }
    Ok(buttons)
}

/// Returns the platform-specific configuration directory.
///
/// Returns `None` if the home directory cannot be determined.
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("io.jaktas", "", "JakTas")
        .map(|dirs| dirs.config_dir().to_path_buf())
}

/// Loads the configuration from the platform config directory.
pub fn load() -> TasConfig {
    config_dir()
        .map(|dir| load_from(&dir.join(CONFIG_FILE_NAME)))
        .unwrap_or_default()
}

/// Loads the configuration from a specific file.
///
/// Returns default values if the file doesn't exist or cannot be parsed.
pub fn load_from(path: &Path) -> TasConfig {
    let Ok(content) = std::fs::read_to_string(path) else {
        return TasConfig::default();
    };
    match toml::from_str(&content) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Ignoring unreadable TAS config");
            TasConfig::default()
        }
    }
}

/// Saves the configuration to a specific file.
///
/// Creates the parent directory if it doesn't exist.
pub fn save_to(config: &TasConfig, path: &Path) -> std::io::Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let content = toml::to_string_pretty(config).map_err(std::io::Error::other)?;
    std::fs::write(path, content)
}
