//! Text-to-speech narration.

use crate::timestamp;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use sjt_config::NarrationConfig;
use sjt_error::{NarrationError, NarrationErrorKind};
use sjt_interface::{NarrationOutcome, Narrator};
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};

/// Characters above which narration is sped up.
const FAST_THRESHOLD_CHARS: usize = 54;
const FAST_SPEED: f32 = 1.5;
const NORMAL_SPEED: f32 = 1.0;
const ERROR_BODY_LIMIT: usize = 500;

/// Speech speed for `text`: the explicit value when given, otherwise 1.5 for
/// text longer than 54 characters and 1.0 for anything shorter.
///
/// Length is counted in characters, not bytes.
///
/// # Examples
///
/// ```
/// use sjt_render::narration_speed;
///
/// assert_eq!(narration_speed(&"字".repeat(54), None), 1.0);
/// assert_eq!(narration_speed(&"字".repeat(55), None), 1.5);
/// assert_eq!(narration_speed("short", Some(1.2)), 1.2);
/// ```
pub fn narration_speed(text: &str, explicit: Option<f32>) -> f32 {
    explicit.unwrap_or_else(|| {
        if text.chars().count() > FAST_THRESHOLD_CHARS {
            FAST_SPEED
        } else {
            NORMAL_SPEED
        }
    })
}

/// Client for an OpenAI-compatible `/audio/speech` endpoint.
#[derive(Debug, Clone)]
pub struct NarrationSynthesizer {
    client: Client,
    api_key: String,
    config: NarrationConfig,
}

impl NarrationSynthesizer {
    /// Creates a synthesizer from the `[narration]` section.
    pub fn new(config: &NarrationConfig, api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            config: config.clone(),
        }
    }

    /// Synthesize `text` into `outdir/hailuo_narration_<timestamp>.mp3`.
    ///
    /// # Errors
    ///
    /// Returns [`NarrationError`] for empty text, a failed request, a
    /// non-audio response, or a write failure.
    #[instrument(
        skip(self, text, outdir),
        fields(chars = text.chars().count(), outdir = %outdir.display())
    )]
    pub async fn synthesize(
        &self,
        text: &str,
        outdir: &Path,
        speed: Option<f32>,
    ) -> Result<PathBuf, NarrationError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(NarrationError::new(NarrationErrorKind::EmptyText));
        }

        let speed = narration_speed(text, speed);
        debug!(speed, voice = %self.config.voice, "Requesting speech");

        let response = self
            .client
            .post(&self.config.url)
            .bearer_auth(&self.api_key)
            .json(&json!({
                "model": self.config.model,
                "input": text,
                "voice": self.config.voice,
                "speed": speed,
            }))
            .send()
            .await
            .map_err(|e| NarrationError::new(NarrationErrorKind::Request(e.to_string())))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NarrationError::new(NarrationErrorKind::Request(format!(
                "status {}: {}",
                status.as_u16(),
                truncate(&body)
            ))));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_lowercase();
        if !content_type.starts_with("audio/") {
            let body = response.text().await.unwrap_or_default();
            return Err(NarrationError::new(NarrationErrorKind::NotAudio {
                content_type,
                body: truncate(&body),
            }));
        }

        let audio = response
            .bytes()
            .await
            .map_err(|e| NarrationError::new(NarrationErrorKind::Request(e.to_string())))?;

        tokio::fs::create_dir_all(outdir)
            .await
            .map_err(|e| {
                NarrationError::new(NarrationErrorKind::Write(format!(
                    "{}: {}",
                    outdir.display(),
                    e
                )))
            })?;
        let path = outdir.join(format!("hailuo_narration_{}.mp3", timestamp()));
        tokio::fs::write(&path, &audio)
            .await
            .map_err(|e| {
                NarrationError::new(NarrationErrorKind::Write(format!(
                    "{}: {}",
                    path.display(),
                    e
                )))
            })?;

        info!(path = %path.display(), bytes = audio.len(), speed, "Narration saved");
        Ok(path)
    }
}

fn truncate(body: &str) -> String {
    body.chars().take(ERROR_BODY_LIMIT).collect()
}

#[async_trait]
impl Narrator for NarrationSynthesizer {
    async fn narrate(
        &self,
        text: &str,
        outdir: &Path,
        target_seconds: Option<u32>,
        speed: Option<f32>,
    ) -> NarrationOutcome {
        debug!(?target_seconds, "Narration target length (informational)");
        match self.synthesize(text, outdir, speed).await {
            Ok(path) => NarrationOutcome::Audio(path),
            Err(e) => {
                warn!(error = %e, "Narration unavailable; continuing without audio");
                NarrationOutcome::no_audio(e.kind.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speed_boundary() {
        let at = "a".repeat(54);
        let over = "a".repeat(55);
        assert_eq!(narration_speed(&at, None), 1.0);
        assert_eq!(narration_speed(&over, None), 1.5);
    }

    #[test]
    fn test_multibyte_text_counts_characters() {
        // 30 CJK characters are 90 bytes but still a short narration
        assert_eq!(narration_speed(&"群".repeat(30), None), 1.0);
    }

    #[test]
    fn test_explicit_speed_wins() {
        assert_eq!(narration_speed(&"a".repeat(100), Some(0.8)), 0.8);
    }
}
