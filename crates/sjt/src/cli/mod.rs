//! Command-line interface module.
//!
//! This module provides the CLI structure and command handlers for the sjt-video binary.

mod commands;
mod run;

pub use commands::{CharacterArgs, Cli, Commands};
pub use run::{GenerateArgs, generate, merge, merge_options, narrate, render};
