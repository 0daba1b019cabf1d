//! Pairing rendered clips with narration and muxing each pair.

use sjt_error::{MediaError, MediaErrorKind, SjtResult};
use sjt_interface::Muxer;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

/// Files in `dir` with the given extension, sorted by name.
///
/// # Errors
///
/// Returns [`MediaErrorKind::FileRead`] if the directory cannot be listed.
pub fn list_files(dir: &Path, extension: &str) -> SjtResult<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir).map_err(|e| {
        MediaError::new(MediaErrorKind::FileRead(format!("{}: {}", dir.display(), e)))
    })?;

    let mut files: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter(|path| {
            path.extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
        })
        .collect();
    files.sort();
    Ok(files)
}

/// Zip videos with audio, repeating the audio list cyclically so every video
/// gets a partner.
///
/// No audio means no pairs.
///
/// # Examples
///
/// ```
/// use sjt_media::pair_files;
/// use std::path::PathBuf;
///
/// let videos: Vec<PathBuf> = ["v1.mp4", "v2.mp4", "v3.mp4"].iter().map(PathBuf::from).collect();
/// let audio: Vec<PathBuf> = ["a1.mp3", "a2.mp3"].iter().map(PathBuf::from).collect();
///
/// let pairs = pair_files(&videos, &audio);
/// assert_eq!(pairs[2], (PathBuf::from("v3.mp4"), PathBuf::from("a1.mp3")));
/// ```
pub fn pair_files(videos: &[PathBuf], audio: &[PathBuf]) -> Vec<(PathBuf, PathBuf)> {
    if audio.is_empty() {
        return Vec::new();
    }
    videos
        .iter()
        .cloned()
        .zip(audio.iter().cycle().cloned())
        .collect()
}

/// Which pairs to merge and how to name the results.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeOptions {
    /// Process at most this many pairs
    pub limit: Option<usize>,
    /// Process only the first pair
    pub only_first_pair: bool,
    /// Base name for outputs; derived from the video name when absent
    pub output_basename: Option<String>,
}

impl MergeOptions {
    /// Merge only the first pair into `<basename>.mp4`.
    pub fn first_pair(basename: impl Into<String>) -> Self {
        Self {
            limit: None,
            only_first_pair: true,
            output_basename: Some(basename.into()),
        }
    }

    /// Output file name for the pair at 1-based `index`.
    fn output_name(&self, video: &Path, index: usize) -> String {
        match &self.output_basename {
            Some(base) if self.only_first_pair => format!("{}.mp4", base),
            Some(base) => format!("{}_{}.mp4", base, index),
            None => {
                let name = video
                    .file_name()
                    .map(|n| n.to_string_lossy().replace(' ', "_"))
                    .unwrap_or_else(|| format!("{}.mp4", index));
                format!("merged_{}", name)
            }
        }
    }
}

/// A pair that failed to merge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeFailure {
    /// Video input
    pub video: PathBuf,
    /// Audio input
    pub audio: PathBuf,
    /// Muxer error
    pub message: String,
}

/// What a merge run produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// Written outputs
    pub merged: Vec<PathBuf>,
    /// Pairs that failed; other pairs still ran
    pub failures: Vec<MergeFailure>,
}

/// Audio/video merger over a [`Muxer`] backend.
#[derive(Clone)]
pub struct AvMerger {
    muxer: Arc<dyn Muxer>,
}

impl std::fmt::Debug for AvMerger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AvMerger").finish_non_exhaustive()
    }
}

impl AvMerger {
    /// Merger using `muxer`.
    pub fn new(muxer: Arc<dyn Muxer>) -> Self {
        Self { muxer }
    }

    /// Merge `.mp4` files in `video_dir` with `.mp3` files in `audio_dir`
    /// into `output_dir`.
    ///
    /// A failing pair is logged and recorded; the remaining pairs still run.
    ///
    /// # Errors
    ///
    /// Returns an error only if a directory cannot be listed or created.
    #[instrument(skip_all, fields(
        video_dir = %video_dir.display(),
        audio_dir = %audio_dir.display(),
        output_dir = %output_dir.display(),
    ))]
    pub async fn merge(
        &self,
        video_dir: &Path,
        audio_dir: &Path,
        output_dir: &Path,
        options: &MergeOptions,
    ) -> SjtResult<MergeReport> {
        tokio::fs::create_dir_all(output_dir).await.map_err(|e| {
            MediaError::new(MediaErrorKind::DirectoryCreation(format!(
                "{}: {}",
                output_dir.display(),
                e
            )))
        })?;

        let videos = list_files(video_dir, "mp4")?;
        let audio = list_files(audio_dir, "mp3")?;
        info!(videos = videos.len(), audio = audio.len(), "Discovered media files");

        let mut pairs = pair_files(&videos, &audio);
        if let Some(limit) = options.limit {
            pairs.truncate(limit);
        }
        if options.only_first_pair {
            pairs.truncate(1);
        }

        let mut report = MergeReport::default();
        for (index, (video, audio)) in pairs.into_iter().enumerate() {
            let output = output_dir.join(options.output_name(&video, index + 1));
            match self.muxer.mux(&video, &audio, &output).await {
                Ok(()) => {
                    info!(
                        video = %video.display(),
                        audio = %audio.display(),
                        output = %output.display(),
                        "Merged pair"
                    );
                    report.merged.push(output);
                }
                Err(e) => {
                    error!(
                        video = %video.display(),
                        audio = %audio.display(),
                        error = %e,
                        "Failed to merge pair"
                    );
                    discard_partial(&output).await;
                    report.failures.push(MergeFailure {
                        video,
                        audio,
                        message: e.to_string(),
                    });
                }
            }
        }

        Ok(report)
    }
}

/// Remove whatever a failed mux left at `output`.
async fn discard_partial(output: &Path) {
    match tokio::fs::remove_file(output).await {
        Ok(()) => warn!(output = %output.display(), "Removed partial merge output"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!(
            output = %output.display(),
            error = %e,
            "Could not remove partial merge output"
        ),
    }
}
