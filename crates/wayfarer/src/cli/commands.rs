//! CLI command definitions.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Wayfarer - move entity images into blob storage, compressing them on the way
#[derive(Parser, Debug)]
#[command(name = "wayfarer")]
#[command(about = "Media compression and storage migration pipeline", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file, layered over the bundled defaults
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Migrate entity images into blob storage
    Migrate {
        /// Migrate only this entity
        #[arg(long)]
        entity_id: Option<String>,

        /// Report planned changes without uploading or writing
        #[arg(long)]
        dry_run: bool,

        /// Restrict to these categories (repeatable)
        #[arg(long = "category")]
        categories: Vec<String>,

        /// Output format
        #[arg(long, value_enum, default_value = "human")]
        format: OutputFormat,
    },

    /// Compress a single image file with a category profile
    Compress {
        /// Image file to compress
        input: PathBuf,

        /// Category whose profile supplies the constraints
        #[arg(long, default_value = "cities")]
        category: String,

        /// Override the profile quality (1-100)
        #[arg(long)]
        quality: Option<u8>,

        /// Keep the smaller of PNG and JPEG instead of WebP
        #[arg(long)]
        smallest: bool,

        /// Write the compressed bytes here
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Serve the migration HTTP API
    Serve {
        /// Socket address to listen on; overrides `server.bind`
        #[arg(long)]
        bind: Option<String>,
    },
}

/// Output format options
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable format
    Human,
    /// JSON format
    Json,
}
