//! The Cue → Storyboard → Video state machine and its fallback path.

use crate::context::{RoleVerdict, RunContext};
use crate::director::{Decision, Director};
use crate::roles::{RoleName, ToolKind, ToolName};
use crate::tools::{GenerationTools, ToolOutput};
use crate::transcript::{Transcript, TranscriptEntry};
use serde_json::{Value, json};
use sjt_core::{Message, PromptSource, ToolCall, VideoPrompt};
use sjt_error::{AgentError, AgentErrorKind, SjtResult};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Everything a swarm run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct SwarmRun {
    /// Final state of the run
    pub context: RunContext,
    /// Audit log of the run
    pub transcript: Transcript,
}

impl SwarmRun {
    /// The prompt to render.
    ///
    /// # Errors
    ///
    /// Returns [`AgentErrorKind::NoVideoPrompt`] when neither the Video role
    /// nor the handoff fallback produced one.
    pub fn video_prompt(&self) -> SjtResult<&VideoPrompt> {
        self.context
            .video_prompt
            .as_ref()
            .ok_or_else(|| AgentError::new(AgentErrorKind::NoVideoPrompt).into())
    }
}

/// Result of executing one tool call.
struct CallOutcome {
    content: String,
    ok: bool,
    handoff: Option<RoleName>,
}

impl CallOutcome {
    fn ok(content: String) -> Self {
        Self {
            content,
            ok: true,
            handoff: None,
        }
    }

    fn rejected(content: String) -> Self {
        Self {
            content,
            ok: false,
            handoff: None,
        }
    }
}

/// Runs the three roles in a single conversation until the Video role
/// finishes, a role ends the run, or the turn budget is spent.
pub struct SwarmOrchestrator {
    tools: GenerationTools,
    director: Arc<dyn Director>,
    max_turns: u32,
}

impl SwarmOrchestrator {
    /// Orchestrator with the given tools, decision strategy and turn budget.
    pub fn new(tools: GenerationTools, director: Arc<dyn Director>, max_turns: u32) -> Self {
        Self {
            tools,
            director,
            max_turns,
        }
    }

    /// Run the state machine from the Cue role.
    ///
    /// When the primary path ends without a video prompt, the payload of the
    /// last handoff to the Video role is fed to `generate_video_prompt`
    /// directly. Cue and Storyboard are never re-run.
    ///
    /// # Errors
    ///
    /// Returns an error if the director fails. A missing video prompt is
    /// reported by [`SwarmRun::video_prompt`].
    #[instrument(skip_all, fields(director = %self.director.kind(), max_turns = self.max_turns))]
    pub async fn run(&self, mut ctx: RunContext) -> SjtResult<SwarmRun> {
        let mut transcript = Transcript::default();
        let mut conversation = ctx.opening_messages();
        for message in &conversation {
            transcript.push(TranscriptEntry::UserInput {
                content: message.content.clone(),
            });
        }

        while !ctx.finished {
            if ctx.turns >= self.max_turns {
                let limit = AgentError::new(AgentErrorKind::TurnLimitExceeded(self.max_turns));
                warn!(error = %limit, role = %ctx.active, "Stopping primary path");
                break;
            }
            ctx.turns += 1;
            let role = ctx.active;

            match self.director.decide(&ctx, &conversation).await? {
                Decision::Finish(text) => {
                    info!(%role, turn = ctx.turns, "Role ended the run");
                    transcript.push(TranscriptEntry::RoleMessage {
                        role,
                        content: text.clone(),
                    });
                    conversation.push(Message::assistant(text, Vec::new()));
                    ctx.finished = true;
                }
                Decision::Call(calls) => {
                    conversation.push(Message::assistant("", calls.clone()));
                    let mut transferred = None;
                    for call in &calls {
                        transcript.push(TranscriptEntry::ToolCall {
                            role,
                            call_id: call.id.clone(),
                            tool: call.name.clone(),
                            arguments: call.arguments.clone(),
                        });

                        let outcome = match transferred {
                            Some(to) => CallOutcome::rejected(format!(
                                "Skipped: control was already transferred to {}",
                                to
                            )),
                            None => self.execute(role, call, &mut ctx, &mut transcript).await,
                        };
                        if outcome.handoff.is_some() {
                            transferred = outcome.handoff;
                        }

                        transcript.push(TranscriptEntry::ToolResult {
                            role,
                            call_id: call.id.clone(),
                            tool: call.name.clone(),
                            content: outcome.content.clone(),
                            ok: outcome.ok,
                        });
                        conversation.push(Message::tool(call.id.clone(), outcome.content));
                    }

                    if let Some(to) = transferred {
                        info!(from = %role, %to, "Handoff");
                        ctx.active = to;
                    }
                }
            }
        }

        if ctx.video_prompt.is_none() {
            self.recover(&mut ctx, &mut transcript).await;
        }

        Ok(SwarmRun {
            context: ctx,
            transcript,
        })
    }

    async fn execute(
        &self,
        role: RoleName,
        call: &ToolCall,
        ctx: &mut RunContext,
        transcript: &mut Transcript,
    ) -> CallOutcome {
        let Some(tool) = role.resolve(&call.name) else {
            let error = AgentError::new(AgentErrorKind::UnknownTool {
                role: role.to_string(),
                tool: call.name.clone(),
            });
            warn!(%error, "Rejected tool call");
            return CallOutcome::rejected(format!("Error: {}", error.kind));
        };

        let argument = match argument_text(tool, &call.arguments) {
            Ok(argument) => argument,
            Err(error) => {
                warn!(%error, "Rejected tool call");
                return CallOutcome::rejected(format!("Error: {}", error.kind));
            }
        };

        if let ToolKind::Handoff(to) = tool.kind() {
            transcript.push(TranscriptEntry::Handoff {
                from: role,
                to,
                payload: argument,
            });
            return CallOutcome {
                content: format!("Successfully transferred to {}", to),
                ok: true,
                handoff: Some(to),
            };
        }

        let output = match self.tools.invoke(tool, &argument).await {
            Ok(output) => output,
            Err(e) => {
                warn!(%tool, error = %e, "Tool failed");
                return CallOutcome::rejected(format!("({} failed: {})", tool, e));
            }
        };

        let content = match output.to_content() {
            Ok(content) => content,
            Err(e) => return CallOutcome::rejected(format!("({} failed: {})", tool, e)),
        };

        match output {
            ToolOutput::Cues(cues) => ctx.cues = Some(cues),
            ToolOutput::Storyboard(storyboard) => ctx.storyboard = Some(storyboard),
            ToolOutput::VideoPrompt(text) => {
                // Latest wins: a regeneration after reflection supersedes earlier prompts.
                ctx.video_prompt = Some(VideoPrompt::new(text, PromptSource::VideoRole));
            }
            ToolOutput::Verdict(verdict) => ctx.verdicts.push(RoleVerdict { role, verdict }),
        }
        CallOutcome::ok(content)
    }

    /// Generate the prompt from the last handoff to the Video role.
    #[instrument(skip_all)]
    async fn recover(&self, ctx: &mut RunContext, transcript: &mut Transcript) {
        let Some(payload) = transcript
            .last_handoff_to(RoleName::Video)
            .map(str::to_string)
        else {
            warn!("No video prompt and no handoff to the Video role to recover from");
            return;
        };

        info!("Recovering video prompt from the last Video handoff");
        let tool = ToolName::GenerateVideoPrompt;
        let call_id = format!("fallback_{}", uuid::Uuid::new_v4().simple());
        transcript.push(TranscriptEntry::ToolCall {
            role: RoleName::Video,
            call_id: call_id.clone(),
            tool: tool.to_string(),
            arguments: json!({ tool.argument(): payload.clone() }),
        });

        let (content, ok) = match self.tools.generate_video_prompt(&payload).await {
            Ok(text) => {
                ctx.video_prompt =
                    Some(VideoPrompt::new(text.clone(), PromptSource::HandoffFallback));
                (text, true)
            }
            Err(e) => {
                warn!(error = %e, "Fallback prompt generation failed");
                (format!("({} failed: {})", tool, e), false)
            }
        };
        transcript.push(TranscriptEntry::ToolResult {
            role: RoleName::Video,
            call_id,
            tool: tool.to_string(),
            content,
            ok,
        });
    }
}

/// The tool's single argument as text.
///
/// Accepts the named key, a lone key of another name, or a bare string.
/// Structured values are passed on as JSON text.
fn argument_text(tool: ToolName, arguments: &Value) -> Result<String, AgentError> {
    let value = match arguments {
        Value::Object(map) => map.get(tool.argument()).or_else(|| {
            if map.len() == 1 {
                map.values().next()
            } else {
                None
            }
        }),
        Value::String(_) => Some(arguments),
        _ => None,
    };

    match value {
        Some(Value::String(text)) if !text.trim().is_empty() => Ok(text.clone()),
        Some(Value::Null) | Some(Value::String(_)) | None => {
            Err(AgentError::new(AgentErrorKind::InvalidArguments {
                tool: tool.to_string(),
                message: format!("missing '{}'", tool.argument()),
            }))
        }
        Some(other) => Ok(other.to_string()),
    }
}
