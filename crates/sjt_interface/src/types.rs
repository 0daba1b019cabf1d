//! Supporting types for the capability traits.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Definition of a tool the model can call.
///
/// # Examples
///
/// ```
/// use sjt_interface::ToolDefinition;
/// use serde_json::json;
///
/// let tool = ToolDefinition {
///     name: "get_cues".to_string(),
///     description: "Extract cues from situation text".to_string(),
///     parameters: json!({
///         "type": "object",
///         "properties": {"text": {"type": "string"}},
///         "required": ["text"]
///     }),
/// };
/// assert_eq!(tool.name, "get_cues");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Name of the tool
    pub name: String,
    /// Human-readable description of what the tool does
    pub description: String,
    /// JSON Schema of the parameters
    pub parameters: serde_json::Value,
}

/// A rendered clip on local disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedVideo {
    /// Remote task id
    pub task_id: String,
    /// Remote file id
    pub file_id: String,
    /// Downloaded file
    pub path: PathBuf,
    /// Scratch directory (`env<N>`) holding the download
    pub dir: PathBuf,
}

/// Result of a narration attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NarrationOutcome {
    /// Audio written to this path
    Audio(PathBuf),
    /// Nothing was produced
    NoAudio {
        /// What went wrong
        reason: String,
    },
}

impl NarrationOutcome {
    /// The audio path, if any.
    pub fn path(&self) -> Option<&Path> {
        match self {
            NarrationOutcome::Audio(path) => Some(path),
            NarrationOutcome::NoAudio { .. } => None,
        }
    }

    /// Shorthand for [`NarrationOutcome::NoAudio`].
    pub fn no_audio(reason: impl Into<String>) -> Self {
        NarrationOutcome::NoAudio {
            reason: reason.into(),
        }
    }
}
