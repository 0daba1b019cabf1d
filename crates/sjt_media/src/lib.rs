//! Local media handling for generated SJT videos.
//!
//! - [`TraitDirectories`] lays out `<root>/<Trait>/env<N>/` run directories
//! - [`AvMerger`] pairs rendered clips with narration and muxes them
//! - [`ArtifactFinalizer`] moves the final clip into place and removes scratch data
//! - [`CharacterStore`] persists the character side-channel file

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod character_store;
mod ffmpeg;
mod finalize;
mod layout;
mod merger;

pub use character_store::CharacterStore;
pub use ffmpeg::FfmpegMuxer;
pub use finalize::{
    ArtifactFinalizer, CleanupReport, CleanupWarning, FinalizeRequest, FinalizedArtifact,
};
pub use layout::{TraitDirectories, allocate_env_dir};
pub use merger::{AvMerger, MergeFailure, MergeOptions, MergeReport, list_files, pair_files};
