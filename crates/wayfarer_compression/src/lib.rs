//! Image re-encoding engine for the Wayfarer media pipeline.
//!
//! Given raw image bytes and per-category constraints, the engine produces
//! the smallest acceptable re-encoding along with size metadata. It never
//! fails its caller: any codec error degrades to the original bytes with a
//! zero reduction and an `unknown` format.
//!
//! # Example
//!
//! ```
//! use wayfarer_compression::{compress, CompressionOptions, OutputFormat};
//!
//! let result = compress(b"definitely not an image", &CompressionOptions::default());
//! assert_eq!(result.format, OutputFormat::Unknown);
//! assert_eq!(result.reduction_percent, 0.0);
//! assert_eq!(result.buffer, b"definitely not an image");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod codec;
mod engine;
mod options;
mod profile;
mod result;

pub use codec::{decode, encode_jpeg, encode_png, encode_webp, fit_within};
pub use engine::{compress, compress_async, compress_smallest, compress_webp, reencode_source_format};
pub use options::{CompressionOptions, TargetFormat, DEFAULT_QUALITY};
pub use profile::CompressionProfiles;
pub use result::{reduction_percent, CompressionResult, OutputFormat};
