//! SJT video generation.
//!
//! Turns a situational judgment test item into a short narrated video clip:
//!
//! 1. Three agent roles (Cue, Storyboard, Video) turn the situation text
//!    into a text-to-video prompt, with a handoff-based fallback
//! 2. A remote video job renders the prompt and the clip is downloaded into
//!    `<output_root>/<Trait>/env<N>/`
//! 3. The situation text is narrated by a speech service
//! 4. ffmpeg merges clip and narration
//! 5. The merged clip is moved to its final place and scratch data removed
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use sjt::{SjtConfig, Situation, VideoSjtPipeline, VideoSjtRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let pipeline = VideoSjtPipeline::from_config(SjtConfig::load(None)?)?;
//!     let request = VideoSjtRequest::builder()
//!         .situation(Situation::from_stem("班级群里有同学公开质疑你的方案。", Default::default()))
//!         .trait_label("N4")
//!         .build()?;
//!
//!     let output = pipeline.run(&request).await?;
//!     println!("{}", output.video_path.display());
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - `sjt_error` - Error types
//! - `sjt_core` - Records passed between stages
//! - `sjt_interface` - Capability traits for models and media backends
//! - `sjt_config` - Layered configuration
//! - `sjt_models` - OpenAI-compatible chat client
//! - `sjt_agents` - Role state machine and generation tools
//! - `sjt_render` - Video job and speech clients
//! - `sjt_media` - Merge, directory layout and finalization
//!
//! This crate re-exports the public surface of all of them.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod pipeline;

pub use pipeline::{VideoSjtPipeline, VideoSjtRequest, VideoSjtRequestBuilder};

pub use sjt_agents::*;
pub use sjt_config::*;
pub use sjt_core::*;
pub use sjt_error::*;
pub use sjt_interface::*;
pub use sjt_media::*;
pub use sjt_models::*;
pub use sjt_render::*;
