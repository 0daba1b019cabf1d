//! The three roles and their static capability table.

use crate::prompts;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sjt_interface::ToolDefinition;

/// A role in the handoff chain. Runs always start at [`RoleName::Cue`].
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
    strum::EnumIter,
)]
pub enum RoleName {
    /// Extracts and reviews cues
    #[default]
    Cue,
    /// Composes and reviews the storyboard narrative
    Storyboard,
    /// Writes and reviews the final video prompt
    Video,
}

/// Every tool a role can call.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ToolName {
    /// Extract cues from the situation text
    GetCues,
    /// Review a cue set
    ReflectCues,
    /// Compose a storyboard from cues
    GenerateStoryboard,
    /// Review a storyboard
    ReflectStoryboard,
    /// Write the video prompt from a storyboard
    GenerateVideoPrompt,
    /// Review a video prompt
    ReflectVideoPrompt,
    /// Hand off from Cue to Storyboard
    TransferToStoryboard,
    /// Hand off from Storyboard to Video
    TransferToVideo,
}

/// What invoking a tool does to the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolKind {
    /// Produces the role's output
    Generate,
    /// Produces an advisory verdict
    Reflect,
    /// Transfers control to another role
    Handoff(RoleName),
}

impl ToolName {
    /// The single argument each tool takes.
    pub fn argument(self) -> &'static str {
        match self {
            ToolName::GetCues => "text",
            ToolName::ReflectCues => "cues_text",
            ToolName::GenerateStoryboard | ToolName::TransferToStoryboard => "cues_data",
            ToolName::ReflectStoryboard
            | ToolName::GenerateVideoPrompt
            | ToolName::TransferToVideo => "storyboard_data",
            ToolName::ReflectVideoPrompt => "video_prompt_data",
        }
    }

    /// Whether this tool generates, reflects or hands off.
    pub fn kind(self) -> ToolKind {
        match self {
            ToolName::GetCues | ToolName::GenerateStoryboard | ToolName::GenerateVideoPrompt => {
                ToolKind::Generate
            }
            ToolName::ReflectCues | ToolName::ReflectStoryboard | ToolName::ReflectVideoPrompt => {
                ToolKind::Reflect
            }
            ToolName::TransferToStoryboard => ToolKind::Handoff(RoleName::Storyboard),
            ToolName::TransferToVideo => ToolKind::Handoff(RoleName::Video),
        }
    }

    fn description(self) -> &'static str {
        match self {
            ToolName::GetCues => "Extract atomic, source-grounded cues from the situation text.",
            ToolName::ReflectCues => "Review a cue set JSON and return a verdict.",
            ToolName::GenerateStoryboard => {
                "Compose one storyboard narrative from the cue JSON and the character features."
            }
            ToolName::ReflectStoryboard => "Review a storyboard JSON and return a verdict.",
            ToolName::GenerateVideoPrompt => {
                "Write the final text-to-video prompt from the storyboard JSON."
            }
            ToolName::ReflectVideoPrompt => "Review a video prompt and return a verdict.",
            ToolName::TransferToStoryboard => "Hand the cue JSON to the Storyboard agent.",
            ToolName::TransferToVideo => "Hand the storyboard JSON to the Video agent.",
        }
    }

    /// Definition advertised to tool-calling models.
    pub fn definition(self) -> ToolDefinition {
        let argument = self.argument();
        ToolDefinition {
            name: self.to_string(),
            description: self.description().to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    argument: {"type": "string"}
                },
                "required": [argument]
            }),
        }
    }
}

/// Static capability set of one role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleSpec {
    /// Generation tool
    pub generate: ToolName,
    /// Reflection tool
    pub reflect: ToolName,
    /// Handoff tool, absent for the last role
    pub handoff: Option<ToolName>,
    /// Director system prompt
    pub system_prompt: &'static str,
}

const CUE: RoleSpec = RoleSpec {
    generate: ToolName::GetCues,
    reflect: ToolName::ReflectCues,
    handoff: Some(ToolName::TransferToStoryboard),
    system_prompt: prompts::CUE_ROLE,
};

const STORYBOARD: RoleSpec = RoleSpec {
    generate: ToolName::GenerateStoryboard,
    reflect: ToolName::ReflectStoryboard,
    handoff: Some(ToolName::TransferToVideo),
    system_prompt: prompts::STORYBOARD_ROLE,
};

const VIDEO: RoleSpec = RoleSpec {
    generate: ToolName::GenerateVideoPrompt,
    reflect: ToolName::ReflectVideoPrompt,
    handoff: None,
    system_prompt: prompts::VIDEO_ROLE,
};

impl RoleName {
    /// The role's capability set.
    pub fn spec(self) -> &'static RoleSpec {
        match self {
            RoleName::Cue => &CUE,
            RoleName::Storyboard => &STORYBOARD,
            RoleName::Video => &VIDEO,
        }
    }

    /// Tools this role may call, generation first.
    pub fn tools(self) -> Vec<ToolName> {
        let spec = self.spec();
        [Some(spec.generate), Some(spec.reflect), spec.handoff]
            .into_iter()
            .flatten()
            .collect()
    }

    /// Resolve a tool name requested by a model, if this role owns it.
    pub fn resolve(self, name: &str) -> Option<ToolName> {
        let tool = name.trim().parse::<ToolName>().ok()?;
        self.tools().contains(&tool).then_some(tool)
    }

    /// Tool definitions for this role.
    pub fn tool_definitions(self) -> Vec<ToolDefinition> {
        self.tools().into_iter().map(ToolName::definition).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_every_tool_belongs_to_exactly_one_role() {
        for tool in ToolName::iter() {
            let owners = RoleName::iter()
                .filter(|role| role.tools().contains(&tool))
                .count();
            assert_eq!(owners, 1, "{tool}");
        }
    }

    #[test]
    fn test_handoffs_chain_forward() {
        assert_eq!(
            ToolName::TransferToStoryboard.kind(),
            ToolKind::Handoff(RoleName::Storyboard)
        );
        assert_eq!(ToolName::TransferToVideo.kind(), ToolKind::Handoff(RoleName::Video));
        assert!(RoleName::Video.spec().handoff.is_none());
    }

    #[test]
    fn test_resolve_rejects_foreign_tools() {
        assert_eq!(RoleName::Cue.resolve("get_cues"), Some(ToolName::GetCues));
        assert_eq!(RoleName::Cue.resolve("generate_video_prompt"), None);
        assert_eq!(RoleName::Video.resolve("launch_rockets"), None);
    }

    #[test]
    fn test_definition_requires_its_argument() {
        let definition = ToolName::TransferToVideo.definition();
        assert_eq!(definition.name, "transfer_to_video");
        assert_eq!(definition.parameters["required"][0], "storyboard_data");
    }
}
