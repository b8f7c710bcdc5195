//! Codec error types.
//!
//! These stay inside the compression engine: every public compression
//! entry point degrades to the original bytes instead of returning them.

/// Kinds of codec failures.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum CompressionErrorKind {
    /// The input could not be decoded as an image
    #[display("Decode failed: {}", _0)]
    Decode(String),
    /// Re-encoding failed
    #[display("Encode to {} failed: {}", format, reason)]
    Encode {
        /// Target format name
        format: String,
        /// Codec message
        reason: String,
    },
    /// No fallback codec exists for the source format
    #[display("Unsupported source format: {}", _0)]
    UnsupportedFormat(String),
}

/// Codec error with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Compression Error: {} at line {} in {}", kind, line, file)]
pub struct CompressionError {
    /// The kind of error that occurred
    pub kind: CompressionErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl CompressionError {
    /// Create a new compression error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: CompressionErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
