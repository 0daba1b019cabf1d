//! sjt-video CLI binary.
//!
//! - Generate a narrated video SJT from a situation file
//! - Render, narrate or merge individual stages

use clap::Parser;
use sjt::{SjtConfig, init_tracing};

mod cli;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    use cli::{Cli, Commands, GenerateArgs, generate, merge, merge_options, narrate, render};

    // Parse command-line arguments
    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.json_logs)?;

    let config = SjtConfig::load(cli.config.as_deref())?;
    tracing::debug!(director = %config.orchestrator.director, "Configuration loaded");

    // Execute the requested command
    match cli.command {
        Commands::Generate {
            situation,
            trait_label,
            outdir,
            basename,
            character,
            director,
        } => {
            generate(
                config,
                GenerateArgs {
                    situation,
                    trait_label,
                    outdir,
                    basename,
                    character,
                    director,
                },
            )
            .await?;
        }

        Commands::Render {
            prompt,
            trait_label,
        } => {
            render(config, &prompt, &trait_label).await?;
        }

        Commands::Narrate {
            text,
            outdir,
            speed,
        } => {
            narrate(config, &text, &outdir, speed).await?;
        }

        Commands::Merge {
            dir,
            basename,
            all,
            limit,
        } => {
            merge(config, &dir, merge_options(basename, all, limit)).await?;
        }
    }

    Ok(())
}
