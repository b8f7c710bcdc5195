//! Wayfarer CLI binary.
//!
//! This binary provides command-line access to Wayfarer's functionality:
//! - Migrate entity images into blob storage
//! - Compress a single image with a category profile
//! - Serve the migration HTTP API

use clap::Parser;
use std::process::ExitCode;
use wayfarer::{init_logging, WayfarerConfig};

mod cli;

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    use cli::{Cli, Commands, handle_compress_command, handle_migrate_command, handle_serve_command};

    // Values in .env become WAYFARER__* overrides
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => WayfarerConfig::from_file(path)?,
        None => WayfarerConfig::load()?,
    };

    init_logging(&config.logging, cli.verbose)?;

    match cli.command {
        Commands::Migrate {
            entity_id,
            dry_run,
            categories,
            format,
        } => {
            let has_failures =
                handle_migrate_command(&config, entity_id, dry_run, categories, format).await?;
            if has_failures {
                return Ok(ExitCode::FAILURE);
            }
        }

        Commands::Compress {
            input,
            category,
            quality,
            smallest,
            output,
        } => {
            handle_compress_command(
                &config,
                &input,
                &category,
                quality,
                smallest,
                output.as_deref(),
            )
            .await?;
        }

        Commands::Serve { bind } => {
            handle_serve_command(&config, bind).await?;
        }
    }

    Ok(ExitCode::SUCCESS)
}
