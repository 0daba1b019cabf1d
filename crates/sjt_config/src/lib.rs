//! Configuration for the SJT video generation pipeline.
//!
//! [`SjtConfig`] is built once at startup and passed by reference into every
//! component that talks to a remote service or touches the filesystem.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod sections;
mod loader;

pub use sections::{
    ApiSection, DirectorKind, LlmConfig, MergeConfig, NarrationConfig, OrchestratorConfig,
    StorageConfig, VideoConfig,
};
pub use loader::SjtConfig;
