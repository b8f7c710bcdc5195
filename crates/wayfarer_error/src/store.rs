//! Document store error types.

/// Kinds of document store errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum StoreErrorKind {
    /// Reading a document failed
    #[display("Failed to read document: {}", _0)]
    Read(String),
    /// Writing a document failed
    #[display("Failed to write document: {}", _0)]
    Write(String),
    /// A stored document could not be decoded into an entity
    #[display("Malformed document {}: {}", id, reason)]
    Malformed {
        /// Document id
        id: String,
        /// Decoder message
        reason: String,
    },
    /// Store backend is unavailable
    #[display("Store unavailable: {}", _0)]
    Unavailable(String),
}

/// Document store error with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Store Error: {} at line {} in {}", kind, line, file)]
pub struct StoreError {
    /// The kind of error that occurred
    pub kind: StoreErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl StoreError {
    /// Create a new store error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: StoreErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
