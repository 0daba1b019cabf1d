//! Core data types for the SJT video generation pipeline.
//!
//! This crate holds the records that flow between pipeline stages
//! (situation → cues → storyboard → video prompt → run output) and the
//! chat message types used to talk to text models.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod character;
mod cue;
mod message;
mod output;
mod prompt;
mod request;
mod role;
mod run_output;
mod situation;
mod storyboard;
mod telemetry;
mod trait_domain;
mod verdict;

pub use character::CharacterSeed;
pub use cue::{Cue, CueSet, Importance};
pub use message::Message;
pub use output::{Output, ToolCall};
pub use prompt::{PromptSource, VideoPrompt};
pub use request::{GenerateRequest, GenerateRequestBuilder, GenerateResponse};
pub use role::Role;
pub use run_output::{RunMeta, RunOutput};
pub use situation::{OptionMap, Situation};
pub use storyboard::{Storyboard, StoryboardBody};
pub use telemetry::init_tracing;
pub use trait_domain::TraitDomain;
pub use verdict::{CueAlignment, ReflectionVerdict};
