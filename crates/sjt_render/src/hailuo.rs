//! Client for the asynchronous text-to-video job API.

use crate::{RetrievedArtifact, TaskStatus, timestamp};
use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::Client;
use serde_json::{Value, json};
use sjt_config::VideoConfig;
use sjt_error::{RenderError, RenderErrorKind, SjtResult};
use sjt_interface::{RenderedVideo, VideoRenderer};
use sjt_media::TraitDirectories;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tracing::{debug, error, info, instrument, warn};

/// Video job client.
///
/// Each remote step is attempted once, except the download, which gets
/// exactly one retrieval-based second attempt.
#[derive(Debug, Clone)]
pub struct HailuoClient {
    client: Client,
    api_key: String,
    config: VideoConfig,
    directories: TraitDirectories,
    poll_interval: Duration,
}

impl HailuoClient {
    /// Creates a client writing downloads under `output_root`.
    pub fn new(
        config: &VideoConfig,
        api_key: impl Into<String>,
        output_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            poll_interval: config.poll_interval(),
            config: config.clone(),
            directories: TraitDirectories::new(output_root),
        }
    }

    /// Override the poll interval from the configuration.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Submit a rendering job and return its task id.
    ///
    /// # Errors
    ///
    /// Returns [`RenderErrorKind::CreateFailed`] on a transport error, a
    /// non-success status, or a response without a task id.
    #[instrument(skip(self, prompt), fields(model = %self.config.model, prompt_len = prompt.len()))]
    pub async fn create_task(&self, prompt: &str) -> SjtResult<String> {
        let body = json!({
            "model": self.config.model,
            "prompt": prompt,
            "duration": self.config.duration,
            "resolution": self.config.resolution,
        });

        let response = self
            .client
            .post(&self.config.create_url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!(error = ?e, "Failed to send create request");
                RenderError::new(RenderErrorKind::CreateFailed {
                    status: 0,
                    message: e.to_string(),
                })
            })?;

        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        if !status.is_success() {
            error!(status = %status, body = %text, "Video task creation rejected");
            return Err(RenderError::new(RenderErrorKind::CreateFailed {
                status: status.as_u16(),
                message: text,
            })
            .into());
        }

        let task_id = serde_json::from_str::<Value>(&text)
            .ok()
            .and_then(|v| v.get("task_id").and_then(Value::as_str).map(str::to_string))
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| {
                RenderError::new(RenderErrorKind::CreateFailed {
                    status: status.as_u16(),
                    message: format!("response carried no task_id: {}", text),
                })
            })?;

        info!(task_id = %task_id, "Video task created");
        Ok(task_id)
    }

    /// Query the job status once.
    ///
    /// # Errors
    ///
    /// Returns [`RenderErrorKind::QueryFailed`] on a transport error, a
    /// non-success status, or a body that is not JSON.
    #[instrument(skip(self))]
    pub async fn query_task(&self, task_id: &str) -> SjtResult<TaskStatus> {
        let response = self
            .client
            .get(&self.config.query_url)
            .bearer_auth(&self.api_key)
            .query(&[("task_id", task_id)])
            .send()
            .await
            .map_err(|e| {
                RenderError::new(RenderErrorKind::QueryFailed {
                    status: 0,
                    message: e.to_string(),
                })
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RenderError::new(RenderErrorKind::QueryFailed {
                status: status.as_u16(),
                message: body,
            })
            .into());
        }

        let raw: Value = response.json().await.map_err(|e| {
            RenderError::new(RenderErrorKind::QueryFailed {
                status: status.as_u16(),
                message: format!("invalid JSON: {}", e),
            })
        })?;
        Ok(TaskStatus::from_value(raw))
    }

    /// Query until a file id appears, at most `max_polls` times.
    ///
    /// A failed query counts as an attempt. There is no sleep after the last
    /// attempt.
    ///
    /// # Errors
    ///
    /// Returns [`RenderErrorKind::PollTimeout`] when the attempts run out.
    #[instrument(skip(self), fields(max_polls = self.config.max_polls))]
    pub async fn poll_until_file(&self, task_id: &str) -> SjtResult<String> {
        let max_polls = self.config.max_polls;

        for attempt in 1..=max_polls {
            match self.query_task(task_id).await {
                Ok(status) => {
                    info!(
                        attempt,
                        max_polls,
                        status = %status.status,
                        file_id = ?status.file_id,
                        "Polled video task"
                    );
                    if let Some(file_id) = status.file_id {
                        return Ok(file_id);
                    }
                }
                Err(e) => {
                    warn!(attempt, max_polls, error = %e, "Video task query failed");
                }
            }

            if attempt < max_polls {
                tokio::time::sleep(self.poll_interval).await;
            }
        }

        error!(task_id, max_polls, "No file id before poll limit");
        Err(RenderError::new(RenderErrorKind::PollTimeout {
            task_id: task_id.to_string(),
            attempts: max_polls,
        })
        .into())
    }

    /// Fetch file metadata.
    ///
    /// # Errors
    ///
    /// Returns [`RenderErrorKind::RetrieveFailed`] on a transport error, a
    /// non-success status, or a body that is not JSON.
    #[instrument(skip(self))]
    pub async fn retrieve_file(
        &self,
        file_id: &str,
        task_id: &str,
    ) -> SjtResult<RetrievedArtifact> {
        let response = self
            .client
            .get(&self.config.retrieve_url)
            .bearer_auth(&self.api_key)
            .query(&[("file_id", file_id), ("task_id", task_id)])
            .send()
            .await
            .map_err(|e| {
                RenderError::new(RenderErrorKind::RetrieveFailed {
                    status: 0,
                    message: e.to_string(),
                })
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %body, "File retrieval rejected");
            return Err(RenderError::new(RenderErrorKind::RetrieveFailed {
                status: status.as_u16(),
                message: body,
            })
            .into());
        }

        let raw: Value = response.json().await.map_err(|e| {
            RenderError::new(RenderErrorKind::RetrieveFailed {
                status: status.as_u16(),
                message: format!("invalid JSON: {}", e),
            })
        })?;
        let artifact = RetrievedArtifact::new(raw);
        debug!(locator = ?artifact.download_locator(), "Retrieved file metadata");
        Ok(artifact)
    }

    /// Stream `url` into `dir/hailuo_video_<timestamp>.mp4`.
    ///
    /// A partially written file is removed on failure.
    ///
    /// # Errors
    ///
    /// Returns [`RenderErrorKind::DownloadFailed`] on any transport, status or
    /// write error.
    #[instrument(skip(self, dir), fields(dir = %dir.display()))]
    pub async fn download(&self, url: &str, dir: &Path) -> SjtResult<PathBuf> {
        let path = dir.join(format!("hailuo_video_{}.mp4", timestamp()));
        match self.stream_to_file(url, &path).await {
            Ok(bytes) => {
                info!(path = %path.display(), bytes, "Video saved");
                Ok(path)
            }
            Err(message) => {
                let _ = tokio::fs::remove_file(&path).await;
                Err(RenderError::new(RenderErrorKind::DownloadFailed(message)).into())
            }
        }
    }

    async fn stream_to_file(&self, url: &str, path: &Path) -> Result<u64, String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| format!("GET {}: {}", url, e))?;
        if !response.status().is_success() {
            return Err(format!("GET {}: status {}", url, response.status()));
        }

        let mut file = tokio::fs::File::create(path)
            .await
            .map_err(|e| format!("{}: {}", path.display(), e))?;
        let mut written = 0u64;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| format!("GET {}: {}", url, e))?;
            file.write_all(&chunk)
                .await
                .map_err(|e| format!("{}: {}", path.display(), e))?;
            written += chunk.len() as u64;
        }
        file.flush()
            .await
            .map_err(|e| format!("{}: {}", path.display(), e))?;
        Ok(written)
    }

    /// Secondary download path: retrieve the metadata again and download
    /// from whatever locator it names.
    ///
    /// # Errors
    ///
    /// Returns the retrieval error, [`RenderErrorKind::LocatorNotFound`] with
    /// the raw response, or the download error.
    #[instrument(skip(self, dir), fields(dir = %dir.display()))]
    pub async fn fetch_via_retrieval(
        &self,
        file_id: &str,
        task_id: &str,
        dir: &Path,
    ) -> SjtResult<PathBuf> {
        let artifact = self.retrieve_file(file_id, task_id).await?;
        let url = artifact.download_locator().ok_or_else(|| {
            RenderError::new(RenderErrorKind::LocatorNotFound(artifact.raw.to_string()))
        })?;
        self.download(&url, dir).await
    }

    /// Create, poll, retrieve and download one clip into a fresh
    /// `<output_root>/<Trait>/env<N>/` directory.
    ///
    /// # Errors
    ///
    /// Every failure is fatal except the primary download, which falls back
    /// to [`HailuoClient::fetch_via_retrieval`] once.
    #[instrument(skip(self, prompt))]
    pub async fn run(&self, prompt: &str, trait_label: &str) -> SjtResult<RenderedVideo> {
        let task_id = self.create_task(prompt).await?;
        let file_id = self.poll_until_file(&task_id).await?;
        let artifact = self.retrieve_file(&file_id, &task_id).await?;

        let dir = self.directories.allocate_run_dir(trait_label)?;
        info!(dir = %dir.display(), "Downloading into run directory");

        let primary = match artifact.download_locator() {
            Some(url) => self.download(&url, &dir).await,
            None => Err(RenderError::new(RenderErrorKind::LocatorNotFound(
                artifact.raw.to_string(),
            ))
            .into()),
        };

        let path = match primary {
            Ok(path) => path,
            Err(e) => {
                warn!(error = %e, "Primary download failed; retrying via retrieval");
                match self.fetch_via_retrieval(&file_id, &task_id, &dir).await {
                    Ok(path) => path,
                    Err(e) => {
                        error!(error = %e, "Secondary download failed");
                        if let Err(cleanup) = tokio::fs::remove_dir_all(&dir).await {
                            warn!(
                                dir = %dir.display(),
                                error = %cleanup,
                                "Could not remove empty run directory"
                            );
                        }
                        return Err(
                            RenderError::new(RenderErrorKind::DownloadFailed(e.to_string())).into(),
                        );
                    }
                }
            }
        };

        Ok(RenderedVideo {
            task_id,
            file_id,
            path,
            dir,
        })
    }
}

#[async_trait]
impl VideoRenderer for HailuoClient {
    async fn render(&self, prompt: &str, trait_label: &str) -> SjtResult<RenderedVideo> {
        self.run(prompt, trait_label).await
    }
}
