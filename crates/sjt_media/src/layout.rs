//! Trait-classified output tree.

use sjt_core::TraitDomain;
use sjt_error::{MediaError, MediaErrorKind, SjtResult};
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

const ENV_PREFIX: &str = "env";

/// Root of `<root>/<Trait>/env<N>/` run directories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraitDirectories {
    root: PathBuf,
}

impl TraitDirectories {
    /// Tree rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory for a trait label, e.g. `<root>/Neuroticism` for `N4`.
    pub fn trait_dir(&self, trait_label: &str) -> PathBuf {
        self.root
            .join(TraitDomain::from_label(trait_label).dir_name())
    }

    /// Create and return the next `env<N>` directory for a trait label.
    ///
    /// # Errors
    ///
    /// Returns [`MediaErrorKind::DirectoryCreation`] if the tree cannot be created.
    pub fn allocate_run_dir(&self, trait_label: &str) -> SjtResult<PathBuf> {
        allocate_env_dir(&self.trait_dir(trait_label))
    }
}

/// Create `parent/env<N>` where `N` is one more than the largest numeric
/// `env` suffix among the existing subdirectories, or 1 if there are none.
///
/// Only safe when no other run allocates under the same parent concurrently.
///
/// # Errors
///
/// Returns [`MediaErrorKind::DirectoryCreation`] if `parent` cannot be created
/// or listed, or the new directory cannot be created.
#[instrument(skip_all, fields(parent = %parent.display()))]
pub fn allocate_env_dir(parent: &Path) -> SjtResult<PathBuf> {
    std::fs::create_dir_all(parent).map_err(|e| {
        MediaError::new(MediaErrorKind::DirectoryCreation(format!(
            "{}: {}",
            parent.display(),
            e
        )))
    })?;

    let entries = std::fs::read_dir(parent).map_err(|e| {
        MediaError::new(MediaErrorKind::DirectoryCreation(format!(
            "{}: {}",
            parent.display(),
            e
        )))
    })?;

    let next = entries
        .filter_map(Result::ok)
        .filter(|entry| entry.path().is_dir())
        .filter_map(|entry| env_index(&entry.file_name().to_string_lossy()))
        .max()
        .map_or(1, |max| max + 1);

    let dir = parent.join(format!("{}{}", ENV_PREFIX, next));
    std::fs::create_dir_all(&dir).map_err(|e| {
        MediaError::new(MediaErrorKind::DirectoryCreation(format!(
            "{}: {}",
            dir.display(),
            e
        )))
    })?;

    debug!(dir = %dir.display(), "Allocated run directory");
    Ok(dir)
}

fn env_index(name: &str) -> Option<u64> {
    let suffix = name.strip_prefix(ENV_PREFIX)?;
    if suffix.is_empty() || !suffix.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    suffix.parse().ok()
}
