//! Script and output storage
//!
//! The engine never touches the filesystem directly. Scripts are read by name
//! and output files (recordings, results logs) are written by file name
//! through a [`ScriptStorage`].

use hashbrown::HashMap;
use std::path::{Component, Path, PathBuf};

/// Storage errors
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// No script with this name
    #[error("no script at {path}")]
    NotFound { path: String },
    /// Name escapes the TAS folder
    #[error("invalid script name '{0}'")]
    InvalidName(String),
    /// Underlying I/O failure
    #[error("{path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Where scripts come from and where output goes
pub trait ScriptStorage {
    /// Read the script called `name` (no folder, no extension)
    fn read_script(&self, name: &str) -> Result<String, StorageError>;

    /// Write an output file next to the scripts
    fn write_output(&mut self, file_name: &str, contents: &str) -> Result<(), StorageError>;

    /// Human readable location of a script, for diagnostics
    fn script_location(&self, name: &str) -> String {
        name.to_string()
    }
}

/// Scripts stored as `<root>/<name><extension>`
#[derive(Debug, Clone)]
pub struct DirStorage {
    root: PathBuf,
    extension: String,
}

impl DirStorage {
    pub fn new(root: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            extension: extension.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn script_path(&self, name: &str) -> Result<PathBuf, StorageError> {
        let relative = Path::new(name);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));
        if name.is_empty() || escapes {
            return Err(StorageError::InvalidName(name.to_string()));
        }
        Ok(self.root.join(format!("{}{}", name, self.extension)))
    }
}

impl ScriptStorage for DirStorage {
    fn read_script(&self, name: &str) -> Result<String, StorageError> {
        let path = self.script_path(name)?;
        std::fs::read_to_string(&path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                StorageError::NotFound {
                    path: path.display().to_string(),
                }
            } else {
                StorageError::Io {
                    path: path.display().to_string(),
                    source,
                }
            }
        })
    }

    fn write_output(&mut self, file_name: &str, contents: &str) -> Result<(), StorageError> {
        let path = self.root.join(file_name);
        let io_error = |source| StorageError::Io {
            path: path.display().to_string(),
            source,
        };
        std::fs::create_dir_all(&self.root).map_err(io_error)?;
        std::fs::write(&path, contents).map_err(io_error)?;
        tracing::debug!(path = %path.display(), "Wrote TAS output");
        Ok(())
    }

    fn script_location(&self, name: &str) -> String {
        self.script_path(name)
            .map(|p| p.display().to_string())
            .unwrap_or_else(|_| name.to_string())
    }
}

/// In-memory storage, for tests and headless tooling
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    scripts: HashMap<String, String>,
    outputs: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style script registration
    pub fn with_script(mut self, name: &str, contents: &str) -> Self {
        self.insert_script(name, contents);
        self
    }

    pub fn insert_script(&mut self, name: &str, contents: &str) {
        self.scripts.insert(name.to_string(), contents.to_string());
    }

    /// Files written so far
    pub fn outputs(&self) -> &HashMap<String, String> {
        &self.outputs
    }

    /// First output whose name ends with `suffix`
    pub fn output_ending_with(&self, suffix: &str) -> Option<(&str, &str)> {
        self.outputs
            .iter()
            .find(|(name, _)| name.ends_with(suffix))
            .map(|(name, contents)| (name.as_str(), contents.as_str()))
    }
}

impl ScriptStorage for MemoryStorage {
    fn read_script(&self, name: &str) -> Result<String, StorageError> {
        self.scripts
            .get(name)
            .cloned()
            .ok_or_else(|| StorageError::NotFound {
                path: name.to_string(),
            })
    }

    fn write_output(&mut self, file_name: &str, contents: &str) -> Result<(), StorageError> {
        self.outputs
            .insert(file_name.to_string(), contents.to_string());
        Ok(())
    }
}

impl<S: ScriptStorage + ?Sized> ScriptStorage for &mut S {
    fn read_script(&self, name: &str) -> Result<String, StorageError> {
        (**self).read_script(name)
    }

    fn write_output(&mut self, file_name: &str, contents: &str) -> Result<(), StorageError> {
        (**self).write_output(file_name, contents)
    }

    fn script_location(&self, name: &str) -> String {
        (**self).script_location(name)
    }
}
