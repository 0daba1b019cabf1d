//! CLI command definitions.

use clap::{Args, Parser, Subcommand};
use sjt::DirectorKind;
use std::path::PathBuf;

/// sjt-video - Narrated situational judgment test videos
#[derive(Parser, Debug)]
#[command(name = "sjt-video")]
#[command(about = "Generate narrated situational judgment test videos", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file layered over the defaults
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the full pipeline for one situation and print the result record
    Generate {
        /// Situation JSON file (stem/situation/context plus options)
        #[arg(long)]
        situation: PathBuf,

        /// Trait label, e.g. "N4" or "神经质"
        #[arg(long = "trait")]
        trait_label: String,

        /// Directory for the final clip
        #[arg(long)]
        outdir: Option<PathBuf>,

        /// Final file name without extension
        #[arg(long)]
        basename: Option<String>,

        /// Character overrides
        #[command(flatten)]
        character: CharacterArgs,

        /// Director override: llm or sequential
        #[arg(long)]
        director: Option<DirectorKind>,
    },

    /// Render a prompt with the video job only and print the saved path
    Render {
        /// Prompt text
        #[arg(long)]
        prompt: String,

        /// Trait label used to pick the output directory
        #[arg(long = "trait", default_value = "Misc")]
        trait_label: String,
    },

    /// Synthesize narration only and print the saved path
    Narrate {
        /// Narration text
        #[arg(long)]
        text: String,

        /// Output directory
        #[arg(long, default_value = ".")]
        outdir: PathBuf,

        /// Explicit speech speed; derived from text length when absent
        #[arg(long)]
        speed: Option<f32>,
    },

    /// Merge the clips and narration already in a directory
    Merge {
        /// Directory holding .mp4 and .mp3 files
        #[arg(long)]
        dir: PathBuf,

        /// Output base name
        #[arg(long)]
        basename: Option<String>,

        /// Merge every pair instead of only the first
        #[arg(long)]
        all: bool,

        /// Merge at most this many pairs
        #[arg(long)]
        limit: Option<usize>,
    },
}

/// Character seed as JSON plus per-field overrides.
#[derive(Args, Debug, Clone, Default)]
pub struct CharacterArgs {
    /// Character seed JSON
    #[arg(long)]
    pub character: Option<String>,

    /// Age
    #[arg(long)]
    pub age: Option<String>,

    /// Gender
    #[arg(long)]
    pub gender: Option<String>,

    /// Social group, e.g. 大学生
    #[arg(long)]
    pub group: Option<String>,

    /// Hairstyle
    #[arg(long)]
    pub hairstyle: Option<String>,

    /// Clothing
    #[arg(long)]
    pub clothing: Option<String>,

    /// Nationality
    #[arg(long)]
    pub nationality: Option<String>,
}
