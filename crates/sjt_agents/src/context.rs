//! Explicit state threaded through one swarm run.

use crate::roles::RoleName;
use serde::Serialize;
use sjt_core::{CharacterSeed, CueSet, Message, ReflectionVerdict, Storyboard, VideoPrompt};

/// A verdict together with the role that requested it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoleVerdict {
    /// Reviewing role
    pub role: RoleName,
    /// The verdict
    pub verdict: ReflectionVerdict,
}

/// Outputs of each stage plus the active role.
///
/// Tools write their latest output here; directors read it to decide what
/// to do next.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunContext {
    /// Situation text the run started from
    pub situation_text: String,
    /// Subject description for the run
    pub character: CharacterSeed,
    /// Trait the stimulus should activate, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trait_label: Option<String>,
    /// Role currently in control
    pub active: RoleName,
    /// Latest cue extraction
    pub cues: Option<CueSet>,
    /// Latest storyboard
    pub storyboard: Option<Storyboard>,
    /// Latest video prompt
    pub video_prompt: Option<VideoPrompt>,
    /// Every verdict, in order
    pub verdicts: Vec<RoleVerdict>,
    /// Director decisions taken so far
    pub turns: u32,
    /// Set once the active role ends the run
    pub finished: bool,
}

impl RunContext {
    /// Fresh context starting at the Cue role.
    pub fn new(situation_text: impl Into<String>, character: CharacterSeed) -> Self {
        Self {
            situation_text: situation_text.into(),
            character,
            ..Self::default()
        }
    }

    /// Attach the target trait.
    pub fn with_trait_label(mut self, trait_label: impl Into<String>) -> Self {
        let label = trait_label.into();
        self.trait_label = (!label.trim().is_empty()).then_some(label);
        self
    }

    /// Most recent verdict requested by `role`.
    pub fn latest_verdict(&self, role: RoleName) -> Option<&ReflectionVerdict> {
        self.verdicts
            .iter()
            .rev()
            .find(|entry| entry.role == role)
            .map(|entry| &entry.verdict)
    }

    /// The run's opening user messages: situation text, then character features.
    pub fn opening_messages(&self) -> Vec<Message> {
        let features =
            serde_json::to_string(&self.character).unwrap_or_else(|_| "{}".to_string());
        vec![
            Message::user(self.situation_text.clone()),
            Message::user(format!("Character features JSON: {}", features)),
        ]
    }
}
