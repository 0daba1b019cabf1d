//! Record returned by a completed video SJT run.

use crate::OptionMap;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Metadata about how the stimulus was produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMeta {
    /// Trait label the run targeted
    #[serde(rename = "trait")]
    pub trait_label: String,
    /// Prompt sent to the rendering service
    pub prompts: String,
    /// Situation text the run started from
    pub text: String,
}

/// Final result of one pipeline run.
///
/// `video_path` refers to a file that existed when the run returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunOutput {
    /// Final merged video
    #[serde(rename = "situation")]
    pub video_path: PathBuf,
    /// Options of the original situation, unchanged
    pub options: OptionMap,
    /// Run metadata
    pub meta: RunMeta,
}
