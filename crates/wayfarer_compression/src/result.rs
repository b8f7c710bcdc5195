//! Compression outcome types.

use serde::{Deserialize, Serialize};

/// Format of a compression result buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// WebP
    #[display("webp")]
    WebP,
    /// PNG
    #[display("png")]
    Png,
    /// JPEG
    #[display("jpeg")]
    Jpeg,
    /// Original bytes returned unchanged
    #[display("unknown")]
    Unknown,
}

impl OutputFormat {
    /// MIME type of the buffer.
    pub fn mime_type(&self) -> &'static str {
        match self {
            OutputFormat::WebP => "image/webp",
            OutputFormat::Png => "image/png",
            OutputFormat::Jpeg => "image/jpeg",
            OutputFormat::Unknown => "application/octet-stream",
        }
    }
}

/// Result of one encode, produced once and never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct CompressionResult {
    /// Encoded bytes (or the original bytes when nothing could be encoded)
    pub buffer: Vec<u8>,
    /// Input size in bytes
    pub original_size: usize,
    /// Output size in bytes
    pub compressed_size: usize,
    /// Size reduction in percent, rounded to two decimals; may be zero or negative
    pub reduction_percent: f64,
    /// Format of `buffer`
    pub format: OutputFormat,
}

impl CompressionResult {
    /// Result for a successful encode.
    pub fn encoded(original_size: usize, buffer: Vec<u8>, format: OutputFormat) -> Self {
        let compressed_size = buffer.len();
        Self {
            buffer,
            original_size,
            compressed_size,
            reduction_percent: reduction_percent(original_size, compressed_size),
            format,
        }
    }

    /// Result that hands back the original bytes untouched.
    pub fn passthrough(raw: &[u8]) -> Self {
        Self {
            buffer: raw.to_vec(),
            original_size: raw.len(),
            compressed_size: raw.len(),
            reduction_percent: 0.0,
            format: OutputFormat::Unknown,
        }
    }
}

/// `((original - compressed) / original) * 100`, rounded to two decimals.
///
/// # Examples
///
/// ```
/// use wayfarer_compression::reduction_percent;
///
/// assert_eq!(reduction_percent(1000, 250), 75.0);
/// assert_eq!(reduction_percent(3, 2), 33.33);
/// assert_eq!(reduction_percent(100, 150), -50.0);
/// assert_eq!(reduction_percent(0, 0), 0.0);
/// ```
pub fn reduction_percent(original: usize, compressed: usize) -> f64 {
    if original == 0 {
        return 0.0;
    }
    let ratio = (original as f64 - compressed as f64) / original as f64;
    (ratio * 100.0 * 100.0).round() / 100.0
}
