//! Image value classification errors.

/// Reasons an image value could not be classified.
///
/// Empty values are not errors; they classify as `ImageSource::Empty`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum ClassificationErrorKind {
    /// The URL scheme is not fetchable
    #[display("Unsupported scheme: {}", _0)]
    UnsupportedScheme(String),
    /// The value is neither a URL nor a base64 payload
    #[display("Unrecognized value: {}", _0)]
    Unrecognized(String),
    /// A data URI whose payload is not valid base64
    #[display("Invalid base64 payload: {}", _0)]
    InvalidBase64(String),
}

/// Classification error with location tracking.
///
/// Never aborts a run; the orchestrator records it as an element issue.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Classification Error: {} at line {} in {}", kind, line, file)]
pub struct ClassificationError {
    /// The kind of error that occurred
    pub kind: ClassificationErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl ClassificationError {
    /// Create a new classification error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: ClassificationErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
