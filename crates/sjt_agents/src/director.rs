//! Strategies that decide what the active role does next.

use crate::context::RunContext;
use crate::roles::{RoleName, ToolName};
use async_trait::async_trait;
use serde_json::{Value, json};
use sjt_config::DirectorKind;
use sjt_core::{GenerateRequest, Message, ToolCall};
use sjt_error::{JsonError, SjtResult, ValidationError};
use sjt_interface::ToolUse;
use std::sync::Arc;
use tracing::{debug, instrument};

/// What the active role does next.
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    /// Execute these tool calls in order
    Call(Vec<ToolCall>),
    /// End the run with this message
    Finish(String),
}

/// Decides the next step for the active role.
#[async_trait]
pub trait Director: Send + Sync {
    /// Decide what `ctx.active` does next, given the shared conversation so far.
    async fn decide(&self, ctx: &RunContext, conversation: &[Message]) -> SjtResult<Decision>;

    /// Strategy kind, for logging.
    fn kind(&self) -> DirectorKind;
}

/// Lets a tool-calling chat model drive each role.
pub struct LlmDirector {
    driver: Arc<dyn ToolUse>,
    temperature: Option<f32>,
}

impl LlmDirector {
    /// Director backed by `driver`.
    pub fn new(driver: Arc<dyn ToolUse>) -> Self {
        Self {
            driver,
            temperature: None,
        }
    }

    /// Override the sampling temperature of director requests.
    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }
}

#[async_trait]
impl Director for LlmDirector {
    #[instrument(skip_all, fields(role = %ctx.active, turn = ctx.turns))]
    async fn decide(&self, ctx: &RunContext, conversation: &[Message]) -> SjtResult<Decision> {
        let role = ctx.active;
        let mut messages = Vec::with_capacity(conversation.len() + 1);
        messages.push(Message::system(role.spec().system_prompt));
        messages.extend(conversation.iter().cloned());

        let request = GenerateRequest::builder()
            .messages(messages)
            .temperature(self.temperature)
            .build()
            .map_err(|e| ValidationError::new(format!("Failed to build director request: {}", e)))?;

        let response = self
            .driver
            .generate_with_tools(&request, &role.tool_definitions())
            .await?;

        let calls = response.tool_calls();
        if calls.is_empty() {
            debug!("Role answered without tool calls");
            return Ok(Decision::Finish(response.text().unwrap_or_default()));
        }
        debug!(calls = calls.len(), "Role requested tool calls");
        Ok(Decision::Call(calls))
    }

    fn kind(&self) -> DirectorKind {
        DirectorKind::Llm
    }
}

/// Fixed generate → reflect → handoff order for every role.
///
/// The Video role finishes instead of handing off. Works without a
/// tool-calling model.
#[derive(Debug, Clone, Copy, Default)]
pub struct SequentialDirector;

impl SequentialDirector {
    /// New sequential director.
    pub fn new() -> Self {
        Self
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> SjtResult<String> {
    serde_json::to_string(value)
        .map_err(|e| JsonError::new(format!("Failed to serialize role output: {}", e)).into())
}

fn call(tool: ToolName, argument: String) -> Decision {
    Decision::Call(vec![ToolCall {
        id: format!("call_{}", uuid::Uuid::new_v4().simple()),
        name: tool.to_string(),
        arguments: json!({ tool.argument(): argument }),
    }])
}

/// Latest output of the active role, serialized as its tools expect.
fn role_output(ctx: &RunContext) -> SjtResult<Option<String>> {
    Ok(match ctx.active {
        RoleName::Cue => ctx.cues.as_ref().map(to_json).transpose()?,
        RoleName::Storyboard => ctx.storyboard.as_ref().map(to_json).transpose()?,
        RoleName::Video => ctx.video_prompt.as_ref().map(|prompt| prompt.text.clone()),
    })
}

/// Input the active role's generation tool works on.
fn role_input(ctx: &RunContext) -> SjtResult<String> {
    Ok(match ctx.active {
        RoleName::Cue => ctx.situation_text.clone(),
        RoleName::Storyboard => match &ctx.cues {
            Some(cues) => to_json(cues)?,
            None => ctx.situation_text.clone(),
        },
        RoleName::Video => match &ctx.storyboard {
            Some(storyboard) => to_json(storyboard)?,
            None => String::new(),
        },
    })
}

fn reflection_input(ctx: &RunContext, output: String) -> String {
    match (ctx.active, &ctx.trait_label) {
        (RoleName::Video, Some(label)) => {
            let mut payload = serde_json::Map::new();
            payload.insert("trait".to_string(), Value::String(label.clone()));
            payload.insert("video_prompt".to_string(), Value::String(output));
            Value::Object(payload).to_string()
        }
        _ => output,
    }
}

#[async_trait]
impl Director for SequentialDirector {
    #[instrument(skip_all, fields(role = %ctx.active, turn = ctx.turns))]
    async fn decide(&self, ctx: &RunContext, _conversation: &[Message]) -> SjtResult<Decision> {
        let spec = ctx.active.spec();
        let Some(output) = role_output(ctx)? else {
            return Ok(call(spec.generate, role_input(ctx)?));
        };

        if ctx.latest_verdict(ctx.active).is_none() {
            return Ok(call(spec.reflect, reflection_input(ctx, output)));
        }

        Ok(match spec.handoff {
            Some(handoff) => call(handoff, output),
            None => Decision::Finish(format!("{} role finished", ctx.active)),
        })
    }

    fn kind(&self) -> DirectorKind {
        DirectorKind::Sequential
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sjt_core::{CharacterSeed, CueSet, PromptSource, ReflectionVerdict, VideoPrompt};

    async fn decide(ctx: &RunContext) -> Decision {
        SequentialDirector::new().decide(ctx, &[]).await.unwrap()
    }

    fn only_call(decision: Decision) -> ToolCall {
        match decision {
            Decision::Call(mut calls) => {
                assert_eq!(calls.len(), 1);
                calls.remove(0)
            }
            Decision::Finish(text) => panic!("unexpected finish: {text}"),
        }
    }

    #[tokio::test]
    async fn test_cue_role_walks_generate_reflect_handoff() {
        let mut ctx = RunContext::new("stem", CharacterSeed::default());
        let first = only_call(decide(&ctx).await);
        assert_eq!(first.name, "get_cues");
        assert_eq!(first.arguments["text"], "stem");

        ctx.cues = Some(CueSet::new("stem", vec![]));
        assert_eq!(only_call(decide(&ctx).await).name, "reflect_cues");

        ctx.verdicts.push(crate::RoleVerdict {
            role: RoleName::Cue,
            verdict: ReflectionVerdict::default(),
        });
        let handoff = only_call(decide(&ctx).await);
        assert_eq!(handoff.name, "transfer_to_storyboard");
        assert!(handoff.arguments["cues_data"].as_str().unwrap().contains("stem"));
    }

    #[tokio::test]
    async fn test_video_reflection_names_the_trait() {
        let mut ctx =
            RunContext::new("stem", CharacterSeed::default()).with_trait_label("神经质");
        ctx.active = RoleName::Video;
        ctx.video_prompt = Some(VideoPrompt::new("a prompt", PromptSource::VideoRole));
        let reflect = only_call(decide(&ctx).await);
        let payload: Value =
            serde_json::from_str(reflect.arguments["video_prompt_data"].as_str().unwrap())
                .unwrap();
        assert_eq!(payload["trait"], "神经质");
        assert_eq!(payload["video_prompt"], "a prompt");

        ctx.verdicts.push(crate::RoleVerdict {
            role: RoleName::Video,
            verdict: ReflectionVerdict::default(),
        });
        assert!(matches!(decide(&ctx).await, Decision::Finish(_)));
    }
}
