//! Compress command handler.

use std::path::Path;
use tracing::info;
use wayfarer::{
    compress_async, MediaCategory, StorageError, StorageErrorKind, TargetFormat, WayfarerConfig,
    WayfarerResult,
};

/// Handle the `compress` command.
pub async fn handle_compress_command(
    config: &WayfarerConfig,
    input: &Path,
    category: &str,
    quality: Option<u8>,
    smallest: bool,
    output: Option<&Path>,
) -> WayfarerResult<()> {
    let category: MediaCategory = category.parse()?;

    let raw = tokio::fs::read(input).await.map_err(|e| {
        StorageError::new(StorageErrorKind::FileRead(format!("{}: {}", input.display(), e)))
    })?;

    let mut options = config.compression.get(category);
    if let Some(quality) = quality {
        options = options.with_quality(quality);
    }
    if smallest {
        options = options.with_target(TargetFormat::Smallest);
    }
    info!(%category, ?options, "Compressing {}", input.display());

    let result = compress_async(raw, options).await;
    println!(
        "{}: {} -> {} bytes ({:.1}% smaller, {})",
        input.display(),
        result.original_size,
        result.compressed_size,
        result.reduction_percent,
        result.format
    );

    if let Some(output) = output {
        tokio::fs::write(output, &result.buffer).await.map_err(|e| {
            StorageError::new(StorageErrorKind::FileWrite(format!("{}: {}", output.display(), e)))
        })?;
        println!("wrote {}", output.display());
    }

    Ok(())
}
