//! Capability traits for the SJT video generation pipeline.
//!
//! Every remote or external collaborator sits behind a trait here so the
//! pipeline can be driven by real clients or in-process fakes.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod traits;
mod types;

pub use traits::{Muxer, Narrator, TextDriver, ToolUse, VideoRenderer};
pub use types::{NarrationOutcome, RenderedVideo, ToolDefinition};
