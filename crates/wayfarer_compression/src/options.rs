//! Compression constraints.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// Quality used when none (or zero) is given.
pub const DEFAULT_QUALITY: u8 = 80;

/// Which encoding path the engine takes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
#[serde(rename_all = "lowercase")]
pub enum TargetFormat {
    /// Re-encode to WebP, falling back to the source format
    #[default]
    #[display("webp")]
    WebP,
    /// Encode PNG and JPEG candidates and keep the smaller
    #[display("smallest")]
    Smallest,
}

/// Target constraints for one encode.
///
/// # Examples
///
/// ```
/// use wayfarer_compression::{CompressionOptions, TargetFormat};
///
/// let options = CompressionOptions::default()
///     .with_quality(70)
///     .with_max_width(1200)
///     .with_target(TargetFormat::Smallest);
/// assert_eq!(options.effective_quality(), 70);
/// assert_eq!(*options.max_width(), Some(1200));
/// assert_eq!(*options.max_height(), None);
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Getters,
    derive_setters::Setters,
)]
#[setters(prefix = "with_", strip_option)]
pub struct CompressionOptions {
    /// Encoder quality, 1-100
    #[serde(default = "default_quality")]
    quality: u8,

    /// Bounding box width; images are never upscaled
    #[serde(default)]
    max_width: Option<u32>,

    /// Bounding box height; images are never upscaled
    #[serde(default)]
    max_height: Option<u32>,

    /// Encoding path
    #[serde(default)]
    target: TargetFormat,
}

fn default_quality() -> u8 {
    DEFAULT_QUALITY
}

impl Default for CompressionOptions {
    fn default() -> Self {
        Self {
            quality: DEFAULT_QUALITY,
            max_width: None,
            max_height: None,
            target: TargetFormat::default(),
        }
    }
}

impl CompressionOptions {
    /// Options bounded to a `max_width` x `max_height` box.
    pub fn bounded(quality: u8, max_width: u32, max_height: u32) -> Self {
        Self {
            quality,
            max_width: Some(max_width),
            max_height: Some(max_height),
            target: TargetFormat::default(),
        }
    }

    /// Quality clamped into 1-100, with 0 meaning the default.
    pub fn effective_quality(&self) -> u8 {
        match self.quality {
            0 => DEFAULT_QUALITY,
            q => q.min(100),
        }
    }
}
