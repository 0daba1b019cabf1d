//! Final instruction text for the rendering job.

use serde::{Deserialize, Serialize};

/// Which path produced the prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
#[serde(rename_all = "snake_case")]
pub enum PromptSource {
    /// The Video role invoked its generation tool
    #[display("video_role")]
    VideoRole,
    /// Recovered from the last handoff payload addressed to the Video role
    #[display("handoff_fallback")]
    HandoffFallback,
}

/// Prompt sent to the video rendering service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoPrompt {
    /// Prompt text
    pub text: String,
    /// Producing path
    pub source: PromptSource,
}

impl VideoPrompt {
    /// Create a prompt.
    pub fn new(text: impl Into<String>, source: PromptSource) -> Self {
        Self {
            text: text.into(),
            source,
        }
    }
}
