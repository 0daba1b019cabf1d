//! Role orchestration for SJT video prompt generation.
//!
//! Three roles run in one conversation: Cue extracts evidence from the
//! situation text, Storyboard turns it into a narrative, and Video writes the
//! final rendering prompt. Each role owns a generation tool, a reflection tool
//! and (except Video) a handoff to the next role. A [`Director`] picks the
//! next tool call; [`SwarmOrchestrator`] executes it against an explicit
//! [`RunContext`] and logs everything to an append-only [`Transcript`].
//!
//! When the run ends without a video prompt, the payload of the last handoff
//! to the Video role is turned into one directly.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod context;
mod director;
mod extraction;
mod orchestrator;
mod prompts;
mod roles;
mod tools;
mod transcript;

pub use context::{RoleVerdict, RunContext};
pub use director::{Decision, Director, LlmDirector, SequentialDirector};
pub use extraction::{parse_json, strip_fences};
pub use orchestrator::{SwarmOrchestrator, SwarmRun};
pub use roles::{RoleName, RoleSpec, ToolKind, ToolName};
pub use tools::{GenerationTools, ToolOutput};
pub use transcript::{Transcript, TranscriptEntry};
