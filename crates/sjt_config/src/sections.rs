//! Per-concern configuration sections.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Chat-completions model used by the generation tools and the director.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmConfig {
    /// OpenAI-compatible API base, without `/chat/completions`
    pub base_url: String,
    /// Model identifier
    pub model: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Optional completion limit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// Environment variable holding the API key
    pub api_key_env: String,
}

/// Remote text-to-video rendering service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoConfig {
    /// Job creation endpoint
    pub create_url: String,
    /// Job status endpoint
    pub query_url: String,
    /// File metadata endpoint
    pub retrieve_url: String,
    /// Rendering model
    pub model: String,
    /// Clip length in seconds
    pub duration: u32,
    /// Output resolution label
    pub resolution: String,
    /// Seconds between status queries
    pub poll_interval_secs: u64,
    /// Status queries before giving up
    pub max_polls: u32,
    /// Environment variable holding the API key
    pub api_key_env: String,
}

impl VideoConfig {
    /// Poll interval as a [`Duration`].
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

/// Text-to-speech service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NarrationConfig {
    /// Speech endpoint
    pub url: String,
    /// TTS model
    pub model: String,
    /// Voice name
    pub voice: String,
    /// Intended clip length; informational only
    #[serde(default)]
    pub target_seconds: Option<u32>,
    /// Environment variable holding the API key
    pub api_key_env: String,
}

/// Filesystem locations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root of the trait-classified output tree
    pub output_root: PathBuf,
    /// Character side-channel file shared by the generation tools
    pub character_file: PathBuf,
    /// Where run transcripts are written
    pub transcript_dir: PathBuf,
}

/// Audio/video muxing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergeConfig {
    /// ffmpeg binary name or path
    pub ffmpeg: String,
    /// Video codec passed to `-c:v`
    pub video_codec: String,
    /// Audio codec passed to `-c:a`
    pub audio_codec: String,
}

/// How roles decide their next tool call.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum DirectorKind {
    /// A tool-calling chat model picks each step
    #[default]
    Llm,
    /// Fixed generate, reflect, handoff sequence
    Sequential,
}

/// Agent swarm settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Decision strategy
    pub director: DirectorKind,
    /// Upper bound on director decisions per run
    pub max_turns: u32,
}

/// Sections that carry an API key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum ApiSection {
    /// `[llm]`
    #[display("llm")]
    Llm,
    /// `[video]`
    #[display("video")]
    Video,
    /// `[narration]`
    #[display("narration")]
    Narration,
}
