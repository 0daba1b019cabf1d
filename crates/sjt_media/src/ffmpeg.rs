//! ffmpeg-backed [`Muxer`].

use async_trait::async_trait;
use sjt_config::MergeConfig;
use sjt_error::{MediaError, MediaErrorKind, SjtResult};
use sjt_interface::Muxer;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, instrument};

/// Muxes with an external `ffmpeg` binary.
///
/// The video stream is re-encoded and the narration is padded with silence,
/// so the output keeps the video's length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FfmpegMuxer {
    binary: String,
    video_codec: String,
    audio_codec: String,
}

impl FfmpegMuxer {
    /// Muxer from the `[merge]` section.
    pub fn from_config(config: &MergeConfig) -> Self {
        Self {
            binary: config.ffmpeg.clone(),
            video_codec: config.video_codec.clone(),
            audio_codec: config.audio_codec.clone(),
        }
    }

    fn args(&self, video: &Path, audio: &Path, output: &Path) -> Vec<String> {
        vec![
            "-y".to_string(),
            "-loglevel".to_string(),
            "error".to_string(),
            "-i".to_string(),
            video.display().to_string(),
            "-i".to_string(),
            audio.display().to_string(),
            "-map".to_string(),
            "0:v:0".to_string(),
            "-map".to_string(),
            "1:a:0".to_string(),
            "-c:v".to_string(),
            self.video_codec.clone(),
            "-c:a".to_string(),
            self.audio_codec.clone(),
            "-af".to_string(),
            "apad".to_string(),
            "-shortest".to_string(),
            output.display().to_string(),
        ]
    }
}

#[async_trait]
impl Muxer for FfmpegMuxer {
    #[instrument(skip(self), fields(binary = %self.binary))]
    async fn mux(&self, video: &Path, audio: &Path, output: &Path) -> SjtResult<()> {
        let args = self.args(video, audio, output);
        debug!(?args, "Running ffmpeg");

        let result = Command::new(&self.binary)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| {
                MediaError::new(MediaErrorKind::MuxerUnavailable(format!(
                    "Failed to spawn {}: {}. Make sure it's installed.",
                    self.binary, e
                )))
            })?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(MediaError::new(MediaErrorKind::MergeFailed(format!(
                "{} exited with {}: {}",
                self.binary,
                result.status,
                stderr.trim()
            )))
            .into());
        }

        Ok(())
    }
}
