//! Transport error types for fetching source images.

/// Kinds of transport failures.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum TransportErrorKind {
    /// The request could not be sent
    #[display("Request failed: {}", _0)]
    Request(String),
    /// The remote answered with a non-success status
    #[display("HTTP {} from {}", status_code, url)]
    Status {
        /// HTTP status code
        status_code: u16,
        /// Requested URL
        url: String,
    },
    /// The response body could not be read
    #[display("Failed to read body: {}", _0)]
    Body(String),
    /// The request timed out
    #[display("Timed out: {}", _0)]
    Timeout(String),
}

impl TransportErrorKind {
    /// Whether a later run could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            TransportErrorKind::Status { status_code, .. } => {
                *status_code == 429 || *status_code >= 500
            }
            TransportErrorKind::Request(_)
            | TransportErrorKind::Body(_)
            | TransportErrorKind::Timeout(_) => true,
        }
    }
}

/// Transport error with location tracking.
///
/// # Examples
///
/// ```
/// use wayfarer_error::{TransportError, TransportErrorKind};
///
/// let err = TransportError::new(TransportErrorKind::Status {
///     status_code: 503,
///     url: "https://img.example/a.jpg".to_string(),
/// });
/// assert!(err.kind.is_transient());
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Transport Error: {} at line {} in {}", kind, line, file)]
pub struct TransportError {
    /// The kind of error that occurred
    pub kind: TransportErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl TransportError {
    /// Create a new transport error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: TransportErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
