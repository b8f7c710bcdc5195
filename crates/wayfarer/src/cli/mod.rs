//! Command-line interface module.
//!
//! This module provides the CLI structure and command handlers for the wayfarer binary.

mod commands;
mod compress;
mod migrate;
mod serve;

pub use commands::{Cli, Commands, OutputFormat};
pub use compress::handle_compress_command;
pub use migrate::handle_migrate_command;
pub use serve::handle_serve_command;
