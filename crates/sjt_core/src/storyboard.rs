//! Consolidated narrative description synthesized from cues.

use crate::Cue;
use serde::{Deserialize, Serialize};

/// The model-authored part of a storyboard.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StoryboardBody {
    /// Observable third-person action up to, not including, the decision
    pub core_video_prompt: String,
}

/// Storyboard output: the cue input carried forward plus the narrative.
///
/// When the model output is not the expected JSON object, `storyboard_raw`
/// holds it verbatim and the narrative falls back to the same text so the
/// Video role still has something to work from.
///
/// # Examples
///
/// ```
/// use sjt_core::Storyboard;
///
/// let board = Storyboard::composed("stem", vec![], "She stands at the door.");
/// assert_eq!(board.core_video_prompt(), Some("She stands at the door."));
///
/// let degraded = Storyboard::unparsed("stem", vec![], "garbled");
/// assert!(degraded.is_degraded());
/// assert_eq!(degraded.core_video_prompt(), Some("garbled"));
/// assert_eq!(degraded.storyboard_raw.as_deref(), Some("garbled"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Storyboard {
    /// Situation text from the cue input
    #[serde(default)]
    pub source_text: String,
    /// Cues from the cue input
    #[serde(default)]
    pub cues: Vec<Cue>,
    /// Parsed narrative
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storyboard: Option<StoryboardBody>,
    /// Raw model output when it was not the expected JSON object
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storyboard_raw: Option<String>,
}

impl Storyboard {
    /// A storyboard with a parsed narrative.
    pub fn composed(
        source_text: impl Into<String>,
        cues: Vec<Cue>,
        core_video_prompt: impl Into<String>,
    ) -> Self {
        Self {
            source_text: source_text.into(),
            cues,
            storyboard: Some(StoryboardBody {
                core_video_prompt: core_video_prompt.into(),
            }),
            storyboard_raw: None,
        }
    }

    /// A degraded storyboard carrying the unparseable model output.
    pub fn unparsed(
        source_text: impl Into<String>,
        cues: Vec<Cue>,
        raw: impl Into<String>,
    ) -> Self {
        let raw = raw.into();
        Self {
            source_text: source_text.into(),
            cues,
            storyboard: Some(StoryboardBody {
                core_video_prompt: raw.clone(),
            }),
            storyboard_raw: Some(raw),
        }
    }

    /// True when the model output could not be parsed.
    pub fn is_degraded(&self) -> bool {
        self.storyboard_raw.is_some()
    }

    /// The narrative text, if the model produced one.
    pub fn core_video_prompt(&self) -> Option<&str> {
        self.storyboard
            .as_ref()
            .map(|body| body.core_video_prompt.as_str())
    }
}
