//! Character side-channel file shared by the generation tools.

use serde_json::Value;
use sjt_core::CharacterSeed;
use sjt_error::{JsonError, MediaError, MediaErrorKind, SjtResult};
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

/// Reads and writes the character-feature JSON file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterStore {
    path: PathBuf,
}

impl CharacterStore {
    /// Store backed by `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Persist the seed for the current run.
    ///
    /// # Errors
    ///
    /// Returns an error if the file or its directory cannot be written.
    #[instrument(skip(self, seed), fields(path = %self.path.display()))]
    pub fn save(&self, seed: &CharacterSeed) -> SjtResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                MediaError::new(MediaErrorKind::DirectoryCreation(format!(
                    "{}: {}",
                    parent.display(),
                    e
                )))
            })?;
        }
        let json = serde_json::to_string_pretty(seed)
            .map_err(|e| JsonError::new(format!("Failed to serialize character: {}", e)))?;
        std::fs::write(&self.path, json).map_err(|e| {
            MediaError::new(MediaErrorKind::FileWrite(format!(
                "{}: {}",
                self.path.display(),
                e
            )))
        })?;
        debug!("Saved character features");
        Ok(())
    }

    /// The stored features, or an empty object if the file is missing or unreadable.
    pub fn load_value(&self) -> Value {
        std::fs::read_to_string(&self.path)
            .ok()
            .and_then(|text| serde_json::from_str(&text).ok())
            .unwrap_or_else(|| {
                debug!(path = %self.path.display(), "No readable character file");
                Value::Object(Default::default())
            })
    }
}
