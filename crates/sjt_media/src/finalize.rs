//! Relocating the final clip and removing per-run scratch data.

use sjt_error::{MediaError, MediaErrorKind, SjtResult};
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};

use crate::list_files;

/// A filesystem entry that could not be removed during cleanup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupWarning {
    /// Entry that was left behind
    pub path: PathBuf,
    /// Why removal failed
    pub message: String,
}

/// Outcome of best-effort scratch cleanup.
///
/// Cleanup never fails a run; everything that went wrong is listed here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanupReport {
    /// Whether cleanup was attempted at all
    pub attempted: bool,
    /// Entries that could not be removed
    pub warnings: Vec<CleanupWarning>,
}

impl CleanupReport {
    /// True when cleanup ran and removed everything.
    pub fn is_clean(&self) -> bool {
        self.attempted && self.warnings.is_empty()
    }

    fn warn(&mut self, path: &Path, error: impl std::fmt::Display) {
        warn!(path = %path.display(), error = %error, "Cleanup left entry behind");
        self.warnings.push(CleanupWarning {
            path: path.to_path_buf(),
            message: error.to_string(),
        });
    }
}

/// Where the run's output is and where it should end up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalizeRequest {
    /// Per-run scratch directory holding the rendered and merged files
    pub work_dir: PathBuf,
    /// Destination directory; the work directory when absent
    pub target_dir: Option<PathBuf>,
    /// Base name the merge step used for its output
    pub merge_basename: Option<String>,
    /// Final file name without extension
    pub out_basename: Option<String>,
}

/// The relocated clip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalizedArtifact {
    /// Final file; exists when returned
    pub path: PathBuf,
    /// Scratch cleanup outcome
    pub cleanup: CleanupReport,
}

/// Moves the final clip into place, removes the scratch directory and
/// applies the caller's file name.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArtifactFinalizer;

impl ArtifactFinalizer {
    /// Create a finalizer.
    pub fn new() -> Self {
        Self
    }

    /// Finalize one run.
    ///
    /// # Errors
    ///
    /// Returns [`MediaErrorKind::OutputNotFound`] if the work directory holds no
    /// `.mp4`, or a move/create error if the clip cannot be relocated.
    /// Cleanup failures are reported in [`FinalizedArtifact::cleanup`] instead.
    #[instrument(skip(self, request), fields(work_dir = %request.work_dir.display()))]
    pub fn finalize(&self, request: &FinalizeRequest) -> SjtResult<FinalizedArtifact> {
        let target_dir = request
            .target_dir
            .clone()
            .unwrap_or_else(|| request.work_dir.clone());

        let located = locate_output(&request.work_dir, request.merge_basename.as_deref())?;
        debug!(located = %located.display(), "Located output clip");

        std::fs::create_dir_all(&target_dir).map_err(|e| {
            MediaError::new(MediaErrorKind::DirectoryCreation(format!(
                "{}: {}",
                target_dir.display(),
                e
            )))
        })?;

        let file_name = located
            .file_name()
            .map(PathBuf::from)
            .ok_or_else(|| {
                MediaError::new(MediaErrorKind::OutputNotFound(
                    request.work_dir.display().to_string(),
                ))
            })?;
        let moved = target_dir.join(file_name);
        if moved != located {
            move_file(&located, &moved)?;
        }

        if !moved.is_file() {
            return Err(MediaError::new(MediaErrorKind::OutputNotFound(
                target_dir.display().to_string(),
            ))
            .into());
        }

        let mut cleanup = CleanupReport::default();
        if !same_dir(&request.work_dir, &target_dir) {
            if is_within(&target_dir, &request.work_dir) {
                cleanup.warn(
                    &request.work_dir,
                    "output directory is inside the work directory; skipping cleanup",
                );
            } else {
                cleanup.attempted = true;
                remove_tree(&request.work_dir, &mut cleanup);
            }
        }

        let path = match &request.out_basename {
            Some(base) if !base.trim().is_empty() => {
                let renamed = target_dir.join(format!("{}.mp4", base));
                if renamed != moved {
                    move_file(&moved, &renamed)?;
                }
                renamed
            }
            _ => moved,
        };

        info!(
            path = %path.display(),
            cleanup_warnings = cleanup.warnings.len(),
            "Finalized output clip"
        );
        Ok(FinalizedArtifact { path, cleanup })
    }
}

/// Prefer a name containing `merged` or starting with the merge base name,
/// otherwise any `.mp4` in the directory.
fn locate_output(work_dir: &Path, merge_basename: Option<&str>) -> SjtResult<PathBuf> {
    let clips = list_files(work_dir, "mp4")?;

    let preferred = clips.iter().find(|path| {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        name.contains("merged")
            || merge_basename.is_some_and(|base| !base.is_empty() && name.starts_with(base))
    });

    preferred
        .or_else(|| clips.first())
        .cloned()
        .ok_or_else(|| {
            MediaError::new(MediaErrorKind::OutputNotFound(
                work_dir.display().to_string(),
            ))
            .into()
        })
}

/// Rename, falling back to copy and remove across filesystems.
fn move_file(from: &Path, to: &Path) -> SjtResult<()> {
    if std::fs::rename(from, to).is_ok() {
        return Ok(());
    }
    std::fs::copy(from, to).map_err(|e| {
        MediaError::new(MediaErrorKind::FileMove(format!(
            "{} -> {}: {}",
            from.display(),
            to.display(),
            e
        )))
    })?;
    if let Err(e) = std::fs::remove_file(from) {
        warn!(path = %from.display(), error = %e, "Copied clip but could not remove source");
    }
    Ok(())
}

/// Remove files bottom-up, then the directories themselves.
fn remove_tree(dir: &Path, report: &mut CleanupReport) {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            report.warn(dir, e);
            return;
        }
    };

    for entry in entries {
        match entry {
            Ok(entry) => {
                let path = entry.path();
                if path.is_dir() {
                    remove_tree(&path, report);
                } else if let Err(e) = std::fs::remove_file(&path) {
                    report.warn(&path, e);
                }
            }
            Err(e) => report.warn(dir, e),
        }
    }

    if let Err(e) = std::fs::remove_dir(dir) {
        report.warn(dir, e);
    }
}

fn same_dir(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

fn is_within(inner: &Path, outer: &Path) -> bool {
    match (inner.canonicalize(), outer.canonicalize()) {
        (Ok(inner), Ok(outer)) => inner.starts_with(outer),
        _ => inner.starts_with(outer),
    }
}
